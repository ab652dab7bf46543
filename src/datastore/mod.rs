//! Datastore client subsystem.
//!
//! # Data Flow
//! ```text
//! DatastoreConfig (name, url)
//!     → open() selects an implementation by name
//!     → readiness gate calls ping() until it succeeds
//!     → API router holds the client for request handling
//!     → close() once at process exit
//! ```
//!
//! # Design Decisions
//! - Clients connect lazily; construction never touches the network
//! - ping() is side-effect free so the readiness gate may call it freely
//! - Monitoring after startup is the client's own concern

pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::DatastoreConfig;

pub use postgres::PostgresDatastore;

/// Errors raised by datastore clients.
#[derive(Debug, Error)]
pub enum DatastoreError {
    /// No client exists for the configured datastore name.
    #[error("unsupported datastore '{0}'")]
    Unsupported(String),

    /// The connection URL could not be parsed.
    #[error("invalid datastore URL: {0}")]
    InvalidUrl(String),

    /// The datastore did not answer a liveness check.
    #[error("datastore unreachable: {0}")]
    Unreachable(String),
}

/// A backing store the API depends on.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Liveness check. Must not modify any state.
    async fn ping(&self) -> Result<(), DatastoreError>;

    /// Release connections. Called once, at exit.
    async fn close(&self);
}

/// Build the client selected by `config.name`.
pub fn open(config: &DatastoreConfig) -> Result<Arc<dyn Datastore>, DatastoreError> {
    match config.name.to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" => {
            let store = PostgresDatastore::connect_lazy(&config.url)?;
            tracing::info!(
                datastore = %config.name,
                url = %config.redacted_url(),
                "Datastore client created"
            );
            Ok(Arc::new(store) as Arc<dyn Datastore>)
        }
        _ => Err(DatastoreError::Unsupported(config.name.clone())),
    }
}
