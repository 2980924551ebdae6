//! Shutdown coordination for the proxy.
//!
//! The handle owns the broadcast sender. Shutdown fires when `trigger`
//! is called (the Ctrl+C listener does this in production) or when the
//! handle itself is dropped, which closes every subscriber.

use tokio::sync::broadcast;

/// Handle that tells the server to stop accepting and drain.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Spawn a task that fires the signal on Ctrl+C.
    pub fn trigger_on_ctrl_c(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                    let _ = tx.send(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                }
            }
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_reaches_all_subscribers() {
        let shutdown = Shutdown::new();
        let mut rx1 = shutdown.subscribe();
        let mut rx2 = shutdown.subscribe();

        shutdown.trigger();

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn dropping_the_handle_ends_waiting_subscribers() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();

        drop(shutdown);

        // A closed channel counts as shutdown for subscribers.
        assert!(rx.recv().await.is_err());
    }
}
