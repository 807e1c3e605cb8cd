//! HTTP handlers for sensor history endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use shared::{is_plausible_humidity, validate_sensor_values, DailyHistorySummary, SensorReading};

use crate::error::{AppError, AppResult};
use crate::services::history::HistoryService;
use crate::AppState;

/// Reading pushed by a field sensor
#[derive(Debug, Deserialize)]
pub struct SensorData {
    pub temp: f64,
    pub hum: f64,
    pub precip: f64,
}

#[derive(Debug, Serialize)]
pub struct SensorSavedResponse {
    pub status: &'static str,
    #[serde(rename = "mensaje")]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub format: Option<String>,
}

/// Add a sensor reading to today's history
pub async fn save_sensor_reading(
    State(state): State<AppState>,
    Json(input): Json<SensorData>,
) -> AppResult<Json<SensorSavedResponse>> {
    validate_sensor_values(input.temp, input.hum, input.precip)
        .map_err(|(field, message)| AppError::invalid_input(field, message))?;

    if !is_plausible_humidity(input.hum) {
        tracing::warn!("Sensor reported humidity outside 0-100%: {}", input.hum);
    }

    let today = Local::now().date_naive();
    let reading = SensorReading {
        temperature_celsius: input.temp,
        humidity_percent: input.hum,
        precipitation_mm: input.precip,
    };
    state.history.record_reading(today, &reading).await?;

    Ok(Json(SensorSavedResponse {
        status: "success",
        message: format!("Datos del sensor guardados para {}", today.format("%Y-%m-%d")),
    }))
}

/// Daily sensor averages, as JSON or CSV
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Response> {
    let summaries: Vec<DailyHistorySummary> = state
        .history
        .list_days()
        .await?
        .iter()
        .map(|day| day.summary())
        .collect();

    if query.format.as_deref() == Some("csv") {
        let csv = HistoryService::export_to_csv(&summaries)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=historial_sensores.csv",
                ),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(summaries).into_response())
}
