//! Late blight risk pipeline
//!
//! Two interchangeable strategies over the same taxonomy:
//! - satellite: NASA POWER hourly data → weekly summary → threshold rule
//! - model: one sensor reading → classification model → normalized verdict

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use shared::{
    aggregate_weekly, classify_with_model, evaluate_rule, validate_coordinates,
    validate_sensor_values, GpsCoordinates, ObservationWindow, RiskVerdict, WeeklySummary,
};

use crate::error::{AppError, AppResult};
use crate::external::{ModelHandle, NasaPowerClient};

/// Risk pipeline shared by all requests
#[derive(Clone)]
pub struct RiskPipeline {
    source: NasaPowerClient,
    model: Arc<ModelHandle>,
}

/// Result of evaluating a location from satellite data
#[derive(Debug, Clone, Serialize)]
pub struct LocationAssessment {
    pub location: GpsCoordinates,
    pub summary: WeeklySummary,
    pub verdict: RiskVerdict,
}

impl RiskPipeline {
    pub fn new(source: NasaPowerClient, model: Arc<ModelHandle>) -> Self {
        Self { source, model }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    /// Fetch and aggregate the window's hourly data.
    ///
    /// Any fetch failure is logged and reported as `None`, the same as a
    /// window with no usable samples. Hours outside the window are ignored.
    pub async fn weekly_summary(
        &self,
        coords: GpsCoordinates,
        window: &ObservationWindow,
    ) -> Option<WeeklySummary> {
        let samples = match self.source.fetch_hourly(coords, window).await {
            Ok(samples) => samples,
            Err(e) => {
                tracing::error!("NASA POWER fetch failed for {}: {}", coords.label(), e);
                return None;
            }
        };

        let fetched = samples.len();
        let samples: Vec<_> = samples
            .into_iter()
            .filter(|sample| window.contains(sample.date()))
            .collect();

        let summary = aggregate_weekly(&samples, window);
        if summary.is_none() {
            tracing::warn!(
                "No usable samples for {} in {} ({} fetched)",
                coords.label(),
                window.label(),
                fetched
            );
        }
        summary
    }

    /// Classify the week ending two days before today
    pub async fn evaluate_from_location(
        &self,
        coords: GpsCoordinates,
    ) -> AppResult<LocationAssessment> {
        let today: NaiveDate = Local::now().date_naive();
        self.evaluate_for_window(coords, ObservationWindow::ending_before(today))
            .await
    }

    /// Classify `coords` over an explicit observation window
    pub async fn evaluate_for_window(
        &self,
        coords: GpsCoordinates,
        window: ObservationWindow,
    ) -> AppResult<LocationAssessment> {
        validate_coordinates(&coords)
            .map_err(|(field, message)| AppError::invalid_input(field, message))?;

        let summary = self
            .weekly_summary(coords, &window)
            .await
            .ok_or(AppError::DataUnavailable)?;

        let verdict = evaluate_rule(summary.mean_temperature_celsius, summary.mean_humidity_percent);
        tracing::info!(
            "Satellite risk for {}: {} (T={} H={})",
            coords.label(),
            verdict.code,
            summary.mean_temperature_celsius,
            summary.mean_humidity_percent
        );

        Ok(LocationAssessment {
            location: coords,
            summary,
            verdict,
        })
    }

    /// Classify one sensor reading with the loaded model
    pub async fn evaluate_from_model(
        &self,
        temperature: f64,
        humidity: f64,
        precipitation: f64,
    ) -> AppResult<RiskVerdict> {
        validate_sensor_values(temperature, humidity, precipitation)
            .map_err(|(field, message)| AppError::invalid_input(field, message))?;

        let model = self.model.get().await.map_err(|e| {
            tracing::error!("Classification model unavailable: {}", e);
            AppError::ServiceUnavailable("Model".to_string())
        })?;

        let verdict = classify_with_model(model.as_ref(), temperature, humidity, precipitation)
            .map_err(|e| {
                tracing::error!("Model inference failed: {}", e);
                AppError::from(e)
            })?;

        tracing::info!(
            "Model risk for T={} H={} P={}: {} ({:?})",
            temperature,
            humidity,
            precipitation,
            verdict.code,
            verdict.confidence
        );
        Ok(verdict)
    }
}
