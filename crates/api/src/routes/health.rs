//! Liveness endpoints.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// GET / — banner the storefront probes before rendering.
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "E-commerce API is running",
    })
}

/// GET /health — returns system health status.
pub async fn check() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}
