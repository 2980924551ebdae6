//! Cache store abstraction and the in-memory implementation.
//!
//! # Responsibilities
//! - Persist `CacheEntry` records with a uniqueness guarantee on key
//! - Expose the four primitives the coordinator needs: find,
//!   insert-if-absent, upsert, delete
//!
//! # Design Decisions
//! - `insert_if_absent` failing visibly is the store-as-lock primitive;
//!   any backend honoring that atomicity contract is substitutable
//! - Store failures are fatal for the current request — no retry loop
//!   against the store, so infrastructure outages are not masked as
//!   cache misses

use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use thiserror::Error;

use crate::cache::entry::CacheEntry;

/// The persistent store could not serve the operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

/// Narrow interface over the persistent key-value store.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up the entry for `key`.
    async fn find_by_key(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Insert `entry` only if no record exists for its key. Returns
    /// `false` when another writer already holds the key — the loser of
    /// a reservation race must re-read and behave as "entry present".
    async fn insert_if_absent(&self, entry: CacheEntry) -> Result<bool, StoreError>;

    /// Set content and timestamp for `key`. Idempotent: recreates the
    /// entry if a concurrent takeover deleted it.
    async fn upsert_by_key(
        &self,
        key: &str,
        content: Bytes,
        timestamp: SystemTime,
    ) -> Result<(), StoreError>;

    /// Remove the entry for `key`, if any.
    async fn delete_by_key(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process store backed by a concurrent map.
///
/// The map's entry API provides the atomic insert-if-absent the
/// protocol relies on.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn find_by_key(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.entries.get(key).map(|entry| entry.clone()))
    }

    async fn insert_if_absent(&self, entry: CacheEntry) -> Result<bool, StoreError> {
        match self.entries.entry(entry.key.clone()) {
            dashmap::Entry::Occupied(_) => Ok(false),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(true)
            }
        }
    }

    async fn upsert_by_key(
        &self,
        key: &str,
        content: Bytes,
        timestamp: SystemTime,
    ) -> Result<(), StoreError> {
        self.entries
            .entry(key.to_string())
            .and_modify(|entry| {
                entry.content = Some(content.clone());
                entry.timestamp = timestamp;
            })
            .or_insert_with(|| CacheEntry {
                key: key.to_string(),
                content: Some(content.clone()),
                timestamp,
            });
        Ok(())
    }

    async fn delete_by_key(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
