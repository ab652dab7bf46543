//! Structured logging.
//!
//! # Responsibilities
//! - Install the process-wide tracing subscriber, once, from `main`
//! - Honour `RUST_LOG`, falling back to the configured filter
//!
//! # Design Decisions
//! - Components only emit events; none of them configures logging
//! - Text output on stdout, for container log collectors
//! - Tests install their own scoped subscribers instead

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

pub use tracing_subscriber::util::TryInitError;

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter.as_str().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .try_init()
}
