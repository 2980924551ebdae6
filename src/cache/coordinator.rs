//! Per-request decision loop for the cache-coalescing protocol.
//!
//! # Responsibilities
//! - Decide serve / fetch / wait for every incoming request
//! - Run the single fetcher per key and write its result
//! - Reclaim keys whose fetcher died (expired reservations)
//!
//! # Design Decisions
//! - The store's atomic insert-if-absent is the only lock; no separate
//!   "fetching" marker is persisted — content absent means fetching
//! - Fetch retries are fixed-interval with no attempt cap
//! - The fetch loop runs in a detached task so a client disconnect never
//!   strands the reservation for the waiters behind it

use std::sync::Arc;
use std::time::SystemTime;

use bytes::Bytes;

use crate::cache::cancel::DisconnectGuard;
use crate::cache::entry::{CacheEntry, EntryState};
use crate::cache::scheduler::Scheduler;
use crate::cache::store::CacheStore;
use crate::cache::CacheError;
use crate::config::CacheConfig;
use crate::observability::metrics;
use crate::upstream::{Fetch, FetchError};

/// Outcome of one pass through the decision step.
enum Decision {
    /// Fresh content found; terminal.
    Serve(Bytes),
    /// This request won the reservation and becomes the fetcher.
    Fetch,
    /// Another fetcher holds a live reservation; poll later.
    Wait,
    /// The picture changed underneath us (lost a reservation race or
    /// reclaimed an expired entry); re-read immediately.
    Reread,
}

/// Owns the per-request state machine. One instance serves all keys;
/// per-key mutual exclusion comes entirely from the store.
pub struct Coordinator {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetch>,
    config: CacheConfig,
    scheduler: Scheduler,
}

impl Coordinator {
    pub fn new(store: Arc<dyn CacheStore>, fetcher: Arc<dyn Fetch>, config: CacheConfig) -> Self {
        let scheduler = Scheduler::new(&config);
        Self {
            store,
            fetcher,
            config,
            scheduler,
        }
    }

    /// Resolve `key` to a body, becoming the fetcher or a waiter as the
    /// protocol dictates. Terminal failures are `InvalidKey`,
    /// `UpstreamUnavailable` and `Store`; transient upstream failures are
    /// retried internally and never surface here.
    pub async fn handle(&self, key: &str, request_id: &str) -> Result<Bytes, CacheError> {
        if key.is_empty() {
            metrics::record_request_outcome("invalid_key");
            return Err(CacheError::InvalidKey);
        }

        let mut guard = DisconnectGuard::new(request_id);
        let result = self.resolve(key, &mut guard).await;

        if let Err(err) = &result {
            let outcome = match err {
                CacheError::InvalidKey => "invalid_key",
                CacheError::UpstreamUnavailable => "upstream_unavailable",
                CacheError::Store(_) => "store_error",
            };
            metrics::record_request_outcome(outcome);
        }

        guard.complete();
        result
    }

    async fn resolve(
        &self,
        key: &str,
        guard: &mut DisconnectGuard,
    ) -> Result<Bytes, CacheError> {
        let mut polls: u32 = 0;

        loop {
            match self.decide(key).await? {
                Decision::Serve(content) => {
                    let outcome = if polls == 0 { "hit" } else { "coalesced" };
                    metrics::record_request_outcome(outcome);
                    return Ok(content);
                }
                Decision::Fetch => {
                    guard.promote_to_fetcher();
                    let body = self.run_fetcher(key).await?;
                    metrics::record_request_outcome("fetched");
                    return Ok(body);
                }
                Decision::Wait => {
                    polls += 1;
                    tracing::debug!(key, polls, "Reservation held elsewhere; polling");
                    self.scheduler.poll_pause().await;
                }
                Decision::Reread => {}
            }
        }
    }

    /// One pass of the protocol: look up the entry and classify it,
    /// reserving or reclaiming the key where the rules call for it.
    async fn decide(&self, key: &str) -> Result<Decision, CacheError> {
        let now = SystemTime::now();

        tracing::debug!(key, "Looking up cache entry");
        let Some(entry) = self.store.find_by_key(key).await? else {
            return self.try_reserve(key, now).await;
        };

        match entry.state(now, &self.config) {
            EntryState::Fresh(content) => Ok(Decision::Serve(content)),
            EntryState::Pending => Ok(Decision::Wait),
            EntryState::Expired => {
                // Stuck-fetch recovery: the previous generation is dead,
                // so the next request reclaims the key.
                tracing::info!(key, "Entry expired; removing before re-reserving");
                metrics::record_takeover();
                self.store.delete_by_key(key).await?;
                self.try_reserve(key, now).await
            }
        }
    }

    async fn try_reserve(&self, key: &str, now: SystemTime) -> Result<Decision, CacheError> {
        let reservation = CacheEntry::reservation(key, now);
        if self.store.insert_if_absent(reservation).await? {
            tracing::info!(key, "Reservation inserted; acting as fetcher");
            Ok(Decision::Fetch)
        } else {
            tracing::debug!(key, "Reservation race lost; re-reading entry");
            Ok(Decision::Reread)
        }
    }

    /// The fetcher path, entered only by the request that won the
    /// reservation. Runs detached so the in-flight fetch and the store
    /// write complete even if the originating client disconnects; the
    /// handler future merely awaits the task.
    async fn run_fetcher(&self, key: &str) -> Result<Bytes, CacheError> {
        let store = Arc::clone(&self.store);
        let fetcher = Arc::clone(&self.fetcher);
        let scheduler = self.scheduler;
        let key = key.to_string();

        let task = tokio::spawn(async move {
            loop {
                tracing::info!(key = %key, "Fetching from upstream");
                match fetcher.fetch(&key).await {
                    Ok(body) => {
                        metrics::record_upstream_attempt("success");
                        let now = SystemTime::now();
                        tracing::info!(
                            key = %key,
                            bytes = body.len(),
                            "Updating entry with fetched content"
                        );
                        store.upsert_by_key(&key, body.clone(), now).await?;
                        return Ok(body);
                    }
                    Err(FetchError::Permanent(status)) => {
                        // The reservation stays in place to expire on its
                        // own, throttling fetch storms for a known-bad key.
                        metrics::record_upstream_attempt("permanent_failure");
                        tracing::warn!(key = %key, %status, "Upstream rejected key");
                        return Err(CacheError::UpstreamUnavailable);
                    }
                    Err(FetchError::Transient(reason)) => {
                        metrics::record_upstream_attempt("transient_failure");
                        tracing::warn!(
                            key = %key,
                            %reason,
                            "Transient upstream failure; will retry"
                        );
                        scheduler.retry_pause().await;
                    }
                    Err(FetchError::Config(reason)) => {
                        // Retrying cannot fix a misconfigured fetcher.
                        metrics::record_upstream_attempt("config_error");
                        tracing::error!(key = %key, %reason, "Fetcher misconfigured");
                        return Err(CacheError::UpstreamUnavailable);
                    }
                }
            }
        });

        task.await.unwrap_or_else(|err| {
            tracing::error!(error = %err, "Fetch task failed");
            Err(CacheError::UpstreamUnavailable)
        })
    }
}
