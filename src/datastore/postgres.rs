//! PostgreSQL client backed by an sqlx pool.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Connection;

use crate::datastore::{Datastore, DatastoreError};

/// Upper bound on a single ping, so a dead server cannot stall the readiness gate.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

const MAX_CONNECTIONS: u32 = 10;

pub struct PostgresDatastore {
    pool: PgPool,
}

impl PostgresDatastore {
    /// Create a pool without opening any connection.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect_lazy(url: &str) -> Result<Self, DatastoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy(url)
            .map_err(|e| DatastoreError::InvalidUrl(e.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Datastore for PostgresDatastore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DatastoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DatastoreError::Unreachable(e.to_string()))?;

        conn.ping()
            .await
            .map_err(|e| DatastoreError::Unreachable(e.to_string()))
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Datastore connections closed");
    }
}
