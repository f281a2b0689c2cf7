//! Health check endpoints for liveness and readiness probes.
//!
//! # Endpoints
//!
//! - `GET /health` - Liveness probe (is the process serving requests?)
//! - `GET /ready` - Readiness probe, reports which backend answers reads

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::state::AppState;

/// Liveness probe. Always 200 once the listener is up.
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "message": "Service is alive and operational"
        })),
    )
}

/// Readiness probe.
///
/// The data source is chosen before the listener binds, so the service is
/// always ready; the body reports whether reads go to the relational store or
/// the CSV fallback.
pub async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "data_source": state.northwind.availability().as_str(),
            "backend": state.northwind.source_name(),
            "tracking": state.tracking.backend(),
        })),
    )
}
