//! The cached record and its freshness rules.

use std::time::{Duration, SystemTime};

use bytes::Bytes;

use crate::config::CacheConfig;

/// The sole persisted entity: one record per key.
///
/// `content` absent means "reservation only, fetch in progress or
/// pending". The store enforces at most one entry per key.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Opaque identifier, immutable once created.
    pub key: String,

    /// Fetched payload; `None` while the current generation's fetcher is
    /// still working.
    pub content: Option<Bytes>,

    /// Creation time, or the last time content was written.
    pub timestamp: SystemTime,
}

/// How an entry must be treated at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// Content present and within the content TTL: serve it.
    Fresh(Bytes),

    /// Reservation held by a live fetcher: wait and poll.
    Pending,

    /// Content past its TTL, or a reservation past the reservation TTL:
    /// delete and re-reserve. The record may physically remain until a
    /// later request reclaims it.
    Expired,
}

/// True when `timestamp` is older than `ttl` as of `now`.
///
/// A timestamp in the future (clock skew between instances) counts as
/// not expired.
pub fn expired(timestamp: SystemTime, now: SystemTime, ttl: Duration) -> bool {
    now.duration_since(timestamp)
        .map(|age| age > ttl)
        .unwrap_or(false)
}

impl CacheEntry {
    /// A fresh reservation: content absent, timestamp = now.
    pub fn reservation(key: impl Into<String>, now: SystemTime) -> Self {
        Self {
            key: key.into(),
            content: None,
            timestamp: now,
        }
    }

    /// Classify this entry against the configured TTLs.
    pub fn state(&self, now: SystemTime, config: &CacheConfig) -> EntryState {
        match &self.content {
            Some(content) if !expired(self.timestamp, now, config.content_ttl()) => {
                EntryState::Fresh(content.clone())
            }
            Some(_) => EntryState::Expired,
            None if expired(self.timestamp, now, config.reservation_ttl()) => EntryState::Expired,
            None => EntryState::Pending,
        }
    }
}
