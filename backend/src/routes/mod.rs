//! Route definitions for the EcoGuardian API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(risk_routes())
        .merge(history_routes())
}

/// Risk evaluation routes
fn risk_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(handlers::predict_from_location))
        .route("/predict-model", post(handlers::predict_from_model))
}

/// Sensor history routes
fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/guardar-sensor", post(handlers::save_sensor_reading))
        .route("/historial", get(handlers::list_history))
}

/// Assistant routes, mounted at the root
pub fn assistant_routes() -> Router<AppState> {
    Router::new().route("/assistant_text", post(handlers::assistant_text))
}
