//! Error handling for the EcoGuardian server
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::InferenceError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("Invalid input: {message}")]
    InvalidInput { field: String, message: String },

    // Classification errors
    #[error("Weather data unavailable")]
    DataUnavailable,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    // Collaborator errors
    #[error("History storage unavailable")]
    StorageUnavailable,

    #[error("Assistant error: {0}")]
    AssistantError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput { .. } => "INVALID_INPUT",
            AppError::DataUnavailable => "DATA_UNAVAILABLE",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::InferenceError(_) => "INFERENCE_ERROR",
            AppError::StorageUnavailable => "STORAGE_UNAVAILABLE",
            AppError::AssistantError(_) => "ASSISTANT_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::InferenceError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::InvalidInput {
            field,
            message: errors.to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message_en, message_es, field) = match &self {
            AppError::InvalidInput { field, message } => (
                StatusCode::BAD_REQUEST,
                message.clone(),
                format!("Datos inválidos: {}", message),
                Some(field.clone()),
            ),
            AppError::DataUnavailable => (
                StatusCode::BAD_GATEWAY,
                "Could not retrieve climate data from NASA".to_string(),
                "No se pudieron obtener datos climáticos de la NASA.".to_string(),
                None,
            ),
            AppError::ServiceUnavailable(what) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("{} is not available", what),
                format!("{} no disponible.", what),
                None,
            ),
            AppError::InferenceError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Model prediction failed: {}", msg),
                format!("Error del modelo: {}", msg),
                None,
            ),
            AppError::StorageUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Sensor history storage is not connected".to_string(),
                "Base de datos del historial no conectada".to_string(),
                None,
            ),
            AppError::AssistantError(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("Assistant error: {}", msg),
                format!("Error IA: {}", msg),
                None,
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Configuration error: {}", msg),
                format!("Error de configuración: {}", msg),
                None,
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred".to_string(),
                "Ocurrió un error en la base de datos".to_string(),
                None,
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                "Error interno del servidor".to_string(),
                None,
            ),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Rejected request: {:?}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message_en,
                message_es,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::invalid_input("lat", "Latitude is required"), StatusCode::BAD_REQUEST),
            (AppError::DataUnavailable, StatusCode::BAD_GATEWAY),
            (AppError::ServiceUnavailable("Model".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::InferenceError("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::StorageUnavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_inference_error_keeps_original_message() {
        let err: AppError = InferenceError::Model("shape mismatch in layer 2".into()).into();
        assert_eq!(err.code(), "INFERENCE_ERROR");
        assert!(err.to_string().contains("shape mismatch in layer 2"));
    }
}
