//! Cache-coalescing core.
//!
//! # Data Flow
//! ```text
//! request (key)
//!     → coordinator.rs (decide: serve / fetch / wait)
//!         → store.rs (find, insert-if-absent, upsert, delete)
//!         → upstream fetcher (single in-flight fetch per key)
//!         → scheduler.rs (fixed-interval retry and poll pauses)
//!     → cancel.rs (client disconnect accounting)
//! ```
//!
//! # Design Decisions
//! - The store's atomic insert-if-absent is the only mutual exclusion;
//!   multiple proxy instances may share one store with no extra lock
//! - Waiters never write; only the reservation holder mutates the entry
//! - Expired entries are reclaimed by the next request, so a crashed
//!   fetcher can never block a key past the reservation TTL

pub mod cancel;
pub mod coordinator;
pub mod entry;
pub mod scheduler;
pub mod store;

pub use coordinator::Coordinator;
pub use entry::{CacheEntry, EntryState};
pub use store::{CacheStore, MemoryStore, StoreError};

use thiserror::Error;

/// Terminal failures surfaced to the client.
///
/// Transient upstream failures never appear here; the coordinator retries
/// them internally until a terminal outcome is reached.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The request carried no usable key. Local and terminal.
    #[error("missing or empty cache key")]
    InvalidKey,

    /// The upstream explicitly rejected the key.
    #[error("upstream unavailable for this key")]
    UpstreamUnavailable,

    /// The cache store could not be reached. Fatal for the current
    /// request; the store itself is never retried.
    #[error(transparent)]
    Store(#[from] StoreError),
}
