//! Structured access logging, plugged into tower-http's `TraceLayer`.
//!
//! Reads: `x-request-id` header, [`ClientAddr`] extension, the raw path.
//! Writes: a `request` span carrying those fields, and one `info` event per
//! request once the response is ready.

use std::time::Duration;

use axum::{extract::Request, response::Response};
use tracing::Span;

use crate::http::middleware::ClientAddr;
use crate::http::RequestIdExt;

/// Span opened for each request, before path normalisation.
pub fn request_span(request: &Request) -> Span {
    let client = request
        .extensions()
        .get::<ClientAddr>()
        .copied()
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        request_id = %request.request_id().unwrap_or("unknown"),
        client_addr = %client,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

pub fn log_response(response: &Response, latency: Duration, _span: &Span) {
    tracing::info!(
        status = response.status().as_u16(),
        latency_ms = latency.as_millis() as u64,
        "Request completed"
    );
}
