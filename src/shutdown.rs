use tokio::{signal, sync::watch};
use tracing::{error, info};

/// Broadcasts a one-shot shutdown request to the HTTP server
pub struct ShutdownCoordinator {
    shutdown_tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self { shutdown_tx }
    }

    /// Receiver that observes `true` once shutdown has been requested
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    pub fn is_shutdown_requested(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Request shutdown; repeated calls are no-ops
    pub fn initiate_shutdown(&self) {
        let changed = self.shutdown_tx.send_if_modified(|requested| {
            let first = !*requested;
            *requested = true;
            first
        });
        if changed {
            info!("Initiating graceful shutdown...");
        }
    }

    /// Wait for Ctrl+C or SIGTERM, then request shutdown
    pub async fn wait_for_shutdown_signal(&self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C signal"),
            _ = terminate => info!("Received terminate signal"),
        }

        self.initiate_shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_initiate_shutdown_notifies_subscribers() {
        let coordinator = ShutdownCoordinator::new();
        let mut rx = coordinator.subscribe();
        assert!(!coordinator.is_shutdown_requested());

        coordinator.initiate_shutdown();

        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .expect("shutdown not observed")
            .unwrap();
        assert!(*rx.borrow());
        assert!(coordinator.is_shutdown_requested());
    }

    #[tokio::test]
    async fn test_initiate_shutdown_is_idempotent() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.initiate_shutdown();

        let mut rx = coordinator.subscribe();
        coordinator.initiate_shutdown();

        let second = tokio::time::timeout(Duration::from_millis(50), rx.changed()).await;
        assert!(second.is_err());
    }
}
