//! Health check

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub database: &'static str,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let (code, status, database) = match state.health.ping().await {
        Ok(()) => (StatusCode::OK, "ok", "connected"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "degraded", "disconnected"),
    };
    (
        code,
        Json(HealthStatus {
            status,
            timestamp: Utc::now().to_rfc3339(),
            database,
        }),
    )
}
