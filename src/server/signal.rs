// Signal handling module
//
// Supported signals:
// - SIGTERM: Stop accepting connections
// - SIGINT:  Stop accepting connections (Ctrl+C)

use std::sync::Arc;
use tokio::sync::Notify;

/// Signal handler state
pub struct SignalHandler {
    /// Shutdown signal (SIGTERM, SIGINT)
    pub shutdown: Arc<Notify>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Wake the accept loop
    pub fn request_shutdown(&self) {
        // notify_one stores a permit if the loop is not waiting yet
        self.shutdown.notify_one();
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start signal handlers (Unix only)
///
/// Registration failures are returned so startup can abort before binding.
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        tracing::info!("{name} received, initiating shutdown");
        handler.request_shutdown();
    });
    Ok(())
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            tracing::info!("Ctrl+C received, initiating shutdown");
            handler.request_shutdown();
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_shutdown_wakes_waiter() {
        let handler = SignalHandler::new();

        // Permit is stored even though nobody is waiting yet
        handler.request_shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(1), handler.shutdown.notified())
            .await
            .unwrap();
    }
}
