//! Fixed-interval pacing for fetch retries and waiter polls.
//!
//! # Design Decisions
//! - Fixed intervals are the documented policy: no jitter, no
//!   exponential growth, no attempt cap
//! - The wait is never shorter than the configured constant
//! - Built on the runtime timer, so pauses never block other work

use std::time::Duration;

use crate::config::CacheConfig;

/// Schedules delayed re-evaluation for the coordinator.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    retry_backoff: Duration,
    poll_interval: Duration,
}

impl Scheduler {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            retry_backoff: config.retry_backoff(),
            poll_interval: config.poll_interval(),
        }
    }

    /// Pause before the fetcher's next upstream attempt.
    pub async fn retry_pause(&self) {
        tokio::time::sleep(self.retry_backoff).await;
    }

    /// Pause before a waiter re-reads the store.
    pub async fn poll_pause(&self) {
        tokio::time::sleep(self.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn scheduler() -> Scheduler {
        Scheduler::new(&CacheConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn retry_pause_waits_at_least_the_backoff() {
        let start = Instant::now();
        scheduler().retry_pause().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_pause_waits_at_least_the_interval() {
        let start = Instant::now();
        scheduler().poll_pause().await;
        assert!(start.elapsed() >= Duration::from_secs(20));
    }
}
