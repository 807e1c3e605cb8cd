//! WebAssembly module for EcoGuardian
//!
//! Provides client-side computation for:
//! - Late blight risk classification from temperature and humidity
//! - Weekly aggregation of hourly observations
//! - Normalization of model predictions run in the browser

use chrono::NaiveDate;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{aggregate_weekly, classify_risk, normalize_output, ModelOutput, RiskVerdict};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("EcoGuardian module loaded"));
}

#[derive(Serialize)]
struct VerdictView<'a> {
    code: &'a str,
    label: &'a str,
    rank: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
}

impl<'a> From<&'a RiskVerdict> for VerdictView<'a> {
    fn from(verdict: &'a RiskVerdict) -> Self {
        Self {
            code: verdict.code,
            label: verdict.label,
            rank: verdict.level.rank(),
            confidence: verdict.confidence,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Classify late blight risk, returning the machine code
#[wasm_bindgen]
pub fn classify_rancha_risk(temperature: f64, humidity: f64) -> String {
    classify_risk(temperature, humidity).code().to_string()
}

/// Classify late blight risk, returning `{code, label, rank}` as JSON
#[wasm_bindgen]
pub fn evaluate_rancha_risk(temperature: f64, humidity: f64) -> Result<String, JsValue> {
    let verdict = shared::evaluate_rule(temperature, humidity);
    to_json(&VerdictView::from(&verdict))
}

/// Aggregate hourly samples into the weekly summary for a window.
///
/// `samples_json` is an array of hourly samples; `window_json` is
/// `{"start": "YYYY-MM-DD", "end": "YYYY-MM-DD"}`. Returns `null` when no
/// sample is usable.
#[wasm_bindgen]
pub fn summarize_week(samples_json: &str, window_json: &str) -> Result<String, JsValue> {
    let samples: Vec<HourlySample> = serde_json::from_str(samples_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid samples JSON: {}", e)))?;
    let window: ObservationWindow = serde_json::from_str(window_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid window JSON: {}", e)))?;

    to_json(&aggregate_weekly(&samples, &window))
}

/// Observation window for a reference date given as "YYYY-MM-DD"
#[wasm_bindgen]
pub fn observation_window(today: &str) -> Result<String, JsValue> {
    let today = NaiveDate::parse_from_str(today, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date: {}", e)))?;
    to_json(&ObservationWindow::ending_before(today))
}

/// Observation window ending two days before the browser's current date
#[wasm_bindgen]
pub fn current_observation_window() -> Result<String, JsValue> {
    let now = js_sys::Date::new_0();
    let today = NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .ok_or_else(|| JsValue::from_str("Invalid browser date"))?;
    to_json(&ObservationWindow::ending_before(today))
}

/// Map a model prediction (`{"shape": ..., "values": ...}`) onto the risk taxonomy
#[wasm_bindgen]
pub fn normalize_model_output(output_json: &str) -> Result<String, JsValue> {
    let output: ModelOutput = serde_json::from_str(output_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid model output JSON: {}", e)))?;
    let verdict = normalize_output(&output).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&VerdictView::from(&verdict))
}

/// Validate coordinates picked on the map
#[wasm_bindgen]
pub fn validate_location(latitude: f64, longitude: f64) -> bool {
    validate_coordinates(&GpsCoordinates::new(latitude, longitude)).is_ok()
}
