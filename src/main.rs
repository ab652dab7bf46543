//! Parrot API server.
//!
//! # Architecture Overview
//!
//! ```text
//!   environment / .env
//!          │
//!          ▼
//!   ┌─────────────┐   ┌──────────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │   config    │──▶│ readiness gate   │──▶│   pipeline   │──▶│    server    │
//!   │  (loader)   │   │ (datastore ping) │   │ id→ip→log→/  │   │ listener +   │
//!   └─────────────┘   └──────────────────┘   │  /api mount  │   │ hyper conns  │
//!                                            └──────────────┘   └──────────────┘
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use parrot_server::config::{self, ObservabilityConfig, ProcessEnv};
use parrot_server::lifecycle::{self, signals, DefaultCollaborators, Shutdown};
use parrot_server::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    // Seed the environment first so RUST_LOG in .env applies.
    let dotenv = config::load_dotenv();

    if let Err(e) = logging::init(&ObservabilityConfig::default()) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "parrot-server starting");

    if let Err(e) = dotenv {
        tracing::error!(error = %e, "Startup failed");
        return ExitCode::FAILURE;
    }

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_handler(shutdown.clone());

    match lifecycle::boot(&ProcessEnv, &DefaultCollaborators, &shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) if e.is_shutdown() => {
            tracing::info!(reason = %e, "Shutdown complete before serving");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}
