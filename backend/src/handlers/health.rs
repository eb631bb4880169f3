//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check document store connectivity
    let store_status = match state.store.ping().await {
        Ok(()) => "connected".to_string(),
        Err(e) => {
            tracing::warn!("Health check could not reach the store: {}", e);
            "disconnected".to_string()
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store_status,
    })
}
