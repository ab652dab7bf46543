//! Request pipeline assembly.
//!
//! # Stage order (outermost first)
//! ```text
//! 1. request id       writes x-request-id (request + response)
//! 2. client address   reads proxy headers / ConnectInfo, writes ClientAddr
//! 3. access log       TraceLayer span from x-request-id, ClientAddr, raw path
//! 4. strip slashes    rewrites the URI path before routing
//! 5. write timeout    bounds handler time
//!     → Router: /api/* → API router tree, anything else → 404
//! ```
//!
//! The order is load-bearing: the access log must see the assigned ID and
//! resolved address, and must log the path before normalisation. Slash
//! stripping must run before any routing, so the chain wraps the router
//! instead of being attached with `Router::layer`.

use std::convert::Infallible;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    Json, Router,
};
use tower::{util::BoxCloneService, ServiceBuilder};
use tower_http::{normalize_path::NormalizePathLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::middleware::{log_response, request_span, resolve_client_addr};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};

/// Prefix the API router tree is mounted under.
pub const API_PREFIX: &str = "/api";

/// The assembled request-handling surface. Cloned per connection, never mutated.
pub type Pipeline = BoxCloneService<Request, Response, Infallible>;

/// Wrap `api` in the fixed middleware chain and mount it under [`API_PREFIX`].
#[allow(deprecated)]
pub fn build_pipeline(api: Router, config: &ServerConfig) -> Pipeline {
    let app = Router::new().nest(API_PREFIX, api).fallback(not_found);

    let service = ServiceBuilder::new()
        .layer(set_request_id_layer())
        .layer(propagate_request_id_layer())
        .layer(from_fn(resolve_client_addr))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(())
                .on_response(log_response)
                .on_eos(())
                .on_failure(()),
        )
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(TimeoutLayer::new(config.write_timeout()))
        .service(app);

    BoxCloneService::new(service)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "not found" })),
    )
}
