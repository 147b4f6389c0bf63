//! Health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::{AppState, Capabilities};

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub capabilities: Capabilities,
}

/// Readiness probe. Not ready until a vision model is configured; optional
/// collaborators (scraper, render service) only change the capabilities list.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let ready = state.is_ready();
    let response = ReadinessResponse {
        status: if ready { "ready" } else { "not_ready" }.to_string(),
        capabilities: state.capabilities.clone(),
    };

    if ready {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
