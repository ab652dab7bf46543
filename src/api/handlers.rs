use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::Serialize;

use crate::api::ApiState;
use crate::http::middleware::ClientAddr;
use crate::http::RequestIdExt;

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// Liveness of the service and its datastore.
pub async fn ping(
    State(state): State<ApiState>,
    Extension(client): Extension<ClientAddr>,
    headers: HeaderMap,
) -> (StatusCode, Json<PingResponse>) {
    match state.datastore.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(PingResponse {
                status: "ok",
                service: Some(state.auth.name().to_string()),
            }),
        ),
        Err(e) => {
            tracing::warn!(
                request_id = headers.request_id().unwrap_or("unknown"),
                client_addr = %client,
                datastore = state.datastore.name(),
                error = %e,
                "Ping failed: datastore unreachable"
            );
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(PingResponse {
                    status: "unavailable",
                    service: None,
                }),
            )
        }
    }
}
