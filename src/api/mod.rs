//! API router tree, mounted by the pipeline under `/api`.
//!
//! Handlers may assume the pipeline has already assigned a request ID,
//! resolved the client address, logged the request and stripped trailing
//! slashes.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::auth::AuthProvider;
use crate::datastore::Datastore;
use self::handlers::ping;

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct ApiState {
    pub datastore: Arc<dyn Datastore>,
    pub auth: Arc<AuthProvider>,
}

pub fn router(datastore: Arc<dyn Datastore>, auth: AuthProvider) -> Router {
    let state = ApiState {
        datastore,
        auth: Arc::new(auth),
    };

    Router::new()
        .route("/ping", get(ping))
        .with_state(state)
}
