//! Client disconnect tracking.
//!
//! Handler futures are dropped when their client goes away. A waiter's
//! pending poll lives inside the handler future, so the drop cancels it
//! and nothing else needs to happen — waiters hold no store-mutating
//! responsibility. The fetcher's work runs in a detached task (see the
//! coordinator) and completes regardless, because abandoning it would
//! strand the reservation for every other waiter until the reservation
//! TTL runs out. The guard here records which requests were abandoned
//! and in which role.

use crate::observability::metrics;

/// Role a request currently plays for its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Holds the reservation; the only caller of upstream.
    Fetcher,
    /// Read-only observer polling for the fetcher's result.
    Waiter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Fetcher => "fetcher",
            Role::Waiter => "waiter",
        }
    }
}

/// Armed at request start, disarmed once a terminal outcome is reached.
/// Dropping an armed guard means the client disconnected mid-flight.
pub struct DisconnectGuard {
    request_id: String,
    role: Role,
    armed: bool,
}

impl DisconnectGuard {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            role: Role::Waiter,
            armed: true,
        }
    }

    /// Record that this request won the reservation.
    pub fn promote_to_fetcher(&mut self) {
        self.role = Role::Fetcher;
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Terminal outcome reached; nothing left to abandon.
    pub fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(
                request_id = %self.request_id,
                role = self.role.as_str(),
                "Client disconnected before completion"
            );
            metrics::record_aborted_request(self.role.as_str());
        }
    }
}
