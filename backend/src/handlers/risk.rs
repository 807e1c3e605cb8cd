//! HTTP handlers for risk evaluation endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use shared::{round_dp, GpsCoordinates};

use crate::error::AppResult;
use crate::AppState;

/// Location to evaluate from satellite data
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Sensor reading to evaluate with the model
#[derive(Debug, Deserialize)]
pub struct ModelPredictRequest {
    #[serde(rename = "temperatura")]
    pub temperature: f64,
    #[serde(rename = "humedad")]
    pub humidity: f64,
    #[serde(rename = "precipitacion")]
    pub precipitation: f64,
}

#[derive(Debug, Serialize)]
pub struct LocationRiskResponse {
    #[serde(rename = "ubicacion")]
    pub location: String,
    #[serde(rename = "datos_climaticos")]
    pub climate: ClimateData,
    #[serde(rename = "analisis_riesgo")]
    pub risk: RiskAnalysis,
}

#[derive(Debug, Serialize)]
pub struct ClimateData {
    #[serde(rename = "fuente")]
    pub source: &'static str,
    #[serde(rename = "periodo_analizado")]
    pub period: String,
    #[serde(rename = "temp_promedio_semanal")]
    pub mean_temperature: f64,
    #[serde(rename = "humedad_promedio_semanal")]
    pub mean_humidity: f64,
    #[serde(rename = "precipitacion_diaria_promedio")]
    pub mean_daily_precipitation: f64,
}

#[derive(Debug, Serialize)]
pub struct RiskAnalysis {
    #[serde(rename = "nivel")]
    pub level: &'static str,
    #[serde(rename = "codigo")]
    pub code: &'static str,
    #[serde(rename = "mensaje")]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ModelRiskResponse {
    #[serde(rename = "prediccion_modelo")]
    pub prediction: ModelPrediction,
    #[serde(rename = "mensaje")]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ModelPrediction {
    #[serde(rename = "clase")]
    pub class: u8,
    pub score: f64,
    #[serde(rename = "nivel_riesgo")]
    pub level: &'static str,
    #[serde(rename = "codigo_riesgo")]
    pub code: &'static str,
}

/// Evaluate late blight risk for a location from the last week of NASA data
pub async fn predict_from_location(
    State(state): State<AppState>,
    Json(input): Json<PredictRequest>,
) -> AppResult<Json<LocationRiskResponse>> {
    let coords = GpsCoordinates::new(input.lat.unwrap_or(0.0), input.lon.unwrap_or(0.0));
    let assessment = state.pipeline.evaluate_from_location(coords).await?;
    let summary = assessment.summary;

    Ok(Json(LocationRiskResponse {
        location: assessment.location.label(),
        climate: ClimateData {
            source: "NASA POWER API",
            period: summary.period,
            mean_temperature: summary.mean_temperature_celsius,
            mean_humidity: summary.mean_humidity_percent,
            mean_daily_precipitation: summary.mean_daily_precipitation_mm,
        },
        risk: RiskAnalysis {
            level: assessment.verdict.label,
            code: assessment.verdict.code,
            message: format!(
                "Riesgo calculado con T={}°C y H={}%",
                summary.mean_temperature_celsius, summary.mean_humidity_percent
            ),
        },
    }))
}

/// Evaluate late blight risk for one sensor reading with the trained model
pub async fn predict_from_model(
    State(state): State<AppState>,
    Json(input): Json<ModelPredictRequest>,
) -> AppResult<Json<ModelRiskResponse>> {
    let verdict = state
        .pipeline
        .evaluate_from_model(input.temperature, input.humidity, input.precipitation)
        .await?;

    Ok(Json(ModelRiskResponse {
        prediction: ModelPrediction {
            class: verdict.level.rank(),
            score: round_dp(verdict.confidence.unwrap_or(1.0), 4),
            level: verdict.label,
            code: verdict.code,
        },
        message: format!("Predicción generada por modelo de IA: {}", verdict.label),
    }))
}
