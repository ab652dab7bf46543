//! OS signal handling.
//!
//! SIGTERM and SIGINT both trigger [`Shutdown`]. There is no reload signal.
//!
//! # Design Decisions
//! - First signal requests a clean shutdown
//! - A second signal forces the process to exit immediately

use std::sync::Arc;

use crate::lifecycle::Shutdown;

/// Exit code used when a second signal forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Spawn a task that fires `shutdown` on the first termination signal and
/// exits the process on the second.
pub fn spawn_signal_handler(shutdown: Arc<Shutdown>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut signals = Signals::install();

        signals.recv().await;
        shutdown.trigger();

        signals.recv().await;
        tracing::warn!("Second shutdown signal received, forcing exit");
        std::process::exit(FORCED_EXIT_CODE);
    })
}

/// Termination signal streams, kept installed for the life of the process.
struct Signals {
    #[cfg(unix)]
    terminate: Option<tokio::signal::unix::Signal>,
}

impl Signals {
    #[cfg(unix)]
    fn install() -> Self {
        use tokio::signal::unix::{signal, SignalKind};

        let terminate = match signal(SignalKind::terminate()) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler, relying on SIGINT");
                None
            }
        };
        Self { terminate }
    }

    #[cfg(not(unix))]
    fn install() -> Self {
        Self {}
    }

    #[cfg(unix)]
    async fn recv(&mut self) {
        match self.terminate.as_mut() {
            Some(terminate) => {
                tokio::select! {
                    _ = terminate.recv() => tracing::info!(signal = "SIGTERM", "Shutdown signal received"),
                    _ = ctrl_c() => {}
                }
            }
            None => ctrl_c().await,
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) {
        ctrl_c().await;
    }
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!(signal = "SIGINT", "Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
