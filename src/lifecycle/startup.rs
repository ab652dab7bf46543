//! Startup orchestration.
//!
//! # Boot order
//! ```text
//! load config → open datastore → readiness gate → API router
//!     → pipeline → bind listener → serve
//! ```
//!
//! # Design Decisions
//! - Fail fast: configuration and bind errors end the boot
//! - Nothing touches the network before the config is fully valid
//! - Listener binds last, so traffic only arrives once the datastore is live
//! - Only `boot` decides that startup failed; components return errors

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::api;
use crate::auth::AuthProvider;
use crate::config::{load_config, ConfigError, DatastoreConfig, EnvSource, ListenerConfig, ProcessConfig};
use crate::datastore::{self, Datastore, DatastoreError};
use crate::http::{build_pipeline, HttpServer};
use crate::lifecycle::Shutdown;
use crate::net::{Listener, ListenerError};
use crate::resilience::{ReadinessError, ReadinessGate};

/// Anything that stops the service from reaching or staying in the serving state.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create datastore client: {0}")]
    Datastore(#[from] DatastoreError),

    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    #[error("listener failed: {0}")]
    Listener(#[from] ListenerError),
}

impl StartupError {
    /// True when boot stopped because shutdown was requested, not because something broke.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, StartupError::Readiness(ReadinessError::Cancelled { .. }))
    }
}

/// Constructors for the external resources boot depends on.
#[async_trait]
pub trait Collaborators: Send + Sync {
    fn open_datastore(&self, config: &DatastoreConfig) -> Result<Arc<dyn Datastore>, DatastoreError>;

    async fn bind(&self, config: &ListenerConfig) -> Result<Listener, ListenerError>;
}

/// Real datastore clients and TCP sockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCollaborators;

#[async_trait]
impl Collaborators for DefaultCollaborators {
    fn open_datastore(&self, config: &DatastoreConfig) -> Result<Arc<dyn Datastore>, DatastoreError> {
        datastore::open(config)
    }

    async fn bind(&self, config: &ListenerConfig) -> Result<Listener, ListenerError> {
        Listener::bind(config).await
    }
}

/// Run the service. Returns once `shutdown` fires, or with the first fatal error.
pub async fn boot<E, C>(env: &E, collaborators: &C, shutdown: &Shutdown) -> Result<(), StartupError>
where
    E: EnvSource,
    C: Collaborators,
{
    // Subscribe first: a signal during setup must still stop the boot.
    let signal = shutdown.subscribe();

    let config = load_config(env)?;

    tracing::info!(
        datastore = %config.datastore.name,
        datastore_url = %config.datastore.redacted_url(),
        domain = %config.auth.domain,
        bind_address = %config.listener.bind_address,
        "Configuration loaded"
    );
    if let Ok(dump) = serde_json::to_string(&config) {
        tracing::debug!(config = %dump, "Effective configuration");
    }

    let datastore = collaborators.open_datastore(&config.datastore)?;

    let result = run(&config, datastore.clone(), collaborators, signal).await;

    datastore.close().await;
    result
}

async fn run<C: Collaborators>(
    config: &ProcessConfig,
    datastore: Arc<dyn Datastore>,
    collaborators: &C,
    mut signal: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    let gate = ReadinessGate::from_config(&config.readiness);
    if !gate.is_bounded() {
        tracing::debug!(interval = ?gate.interval(), "Waiting for datastore without a deadline");
    }
    gate.wait_until_ready(datastore.name(), || datastore.ping(), &mut signal)
        .await?;

    let auth = AuthProvider::from_config(&config.auth);
    let api = api::router(datastore.clone(), auth);
    let pipeline = build_pipeline(api, &config.server);

    let listener = collaborators.bind(&config.listener).await?;
    let server = HttpServer::new(pipeline, config.server.clone());
    server.run(listener, signal).await?;

    Ok(())
}
