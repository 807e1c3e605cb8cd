//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub model_loaded: bool,
    pub assistant_configured: bool,
    pub database: String,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = if !state.history.is_connected() {
        "not_configured"
    } else if state.history.ping().await {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        model_loaded: state.pipeline.model_loaded(),
        assistant_configured: state.assistant.is_configured(),
        database: database.to_string(),
    })
}
