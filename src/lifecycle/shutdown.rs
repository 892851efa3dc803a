//! Shutdown coordination for the gateway.
//!
//! Built on a `watch` channel so the triggered state is sticky: a signal
//! obtained after `trigger` still resolves immediately.

use std::sync::Arc;
use tokio::sync::watch;

/// Coordinator for graceful shutdown. Clones share one state.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A handle that resolves once shutdown has been triggered.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Flip into the shutting-down state.
    ///
    /// Returns `true` only for the call that actually changed the state.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|triggered| !std::mem::replace(triggered, true))
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side handed to the server and background tasks.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Wait until shutdown is triggered, or the coordinator is gone.
    pub async fn wait(mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let a = shutdown.subscribe();
        let b = shutdown.clone().subscribe();

        assert!(shutdown.trigger());

        tokio::time::timeout(Duration::from_secs(1), async {
            a.wait().await;
            b.wait().await;
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_earlier_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), shutdown.subscribe().wait())
            .await
            .unwrap();
    }

    #[test]
    fn test_trigger_is_idempotent() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_triggered());

        assert!(shutdown.trigger());
        assert!(!shutdown.trigger());
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_untriggered_signal_stays_pending() {
        let shutdown = Shutdown::new();
        let pending = tokio::time::timeout(Duration::from_millis(50), shutdown.subscribe().wait()).await;
        assert!(pending.is_err());
    }
}
