//! EcoGuardian backend
//!
//! HTTP service that estimates potato late blight ("rancha") risk from NASA
//! POWER satellite data or from a trained model fed with field sensor
//! readings, keeps a daily sensor history and relays farmer questions to a
//! generative assistant.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

use external::{GeminiClient, ModelHandle, NasaPowerClient};
use services::{AssistantService, HistoryService, RiskPipeline};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: RiskPipeline,
    pub history: HistoryService,
    pub assistant: AssistantService,
}

impl AppState {
    /// Build every collaborator from configuration.
    ///
    /// The model is not read here; it loads on the first model prediction.
    pub fn from_config(config: Config, db: Option<PgPool>) -> AppResult<Self> {
        let source = NasaPowerClient::new(&config.nasa_power)
            .map_err(|e| AppError::Configuration(format!("NASA POWER client: {}", e)))?;
        let model = Arc::new(ModelHandle::new(&config.model.path));
        let assistant = GeminiClient::from_config(&config.assistant)
            .map_err(|e| AppError::Configuration(format!("assistant client: {}", e)))?;

        if assistant.is_none() {
            tracing::warn!("No assistant API key configured; /assistant_text will be unavailable");
        }

        Ok(Self {
            config: Arc::new(config),
            pipeline: RiskPipeline::new(source, model),
            history: HistoryService::new(db),
            assistant: AssistantService::new(assistant),
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes())
        .merge(routes::assistant_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> Json<Value> {
    Json(json!({ "mensaje": "EcoGuardian API - monitoreo de riesgo de rancha" }))
}
