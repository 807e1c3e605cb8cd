//! NASA POWER client for hourly point observations
//!
//! Fetches 2 m air temperature (T2M), 2 m relative humidity (RH2M) and
//! corrected total precipitation (PRECTOTCORR) for a point and date range.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shared::{GpsCoordinates, HourlySample, ObservationWindow, MISSING_VALUE};
use thiserror::Error;

use crate::config::NasaPowerConfig;

const PARAMETERS: &str = "T2M,RH2M,PRECTOTCORR";

/// Why a fetch produced no samples
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("NASA POWER returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// NASA POWER hourly API client
#[derive(Clone)]
pub struct NasaPowerClient {
    client: Client,
    base_url: String,
    community: String,
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: Option<PowerProperties>,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: Option<PowerParameters>,
}

/// Hourly series keyed by "YYYYMMDDHH"
#[derive(Debug, Deserialize)]
pub struct PowerParameters {
    #[serde(rename = "T2M")]
    pub temperature: BTreeMap<String, f64>,
    #[serde(rename = "RH2M")]
    pub humidity: BTreeMap<String, f64>,
    #[serde(rename = "PRECTOTCORR")]
    pub precipitation: BTreeMap<String, f64>,
}

impl NasaPowerClient {
    /// Create a client from configuration, with a bounded request timeout
    pub fn new(config: &NasaPowerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            community: config.community.clone(),
        })
    }

    /// Create a client against a custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            community: "SB".to_string(),
        }
    }

    /// Fetch hourly samples for `coords` over `window`
    pub async fn fetch_hourly(
        &self,
        coords: GpsCoordinates,
        window: &ObservationWindow,
    ) -> Result<Vec<HourlySample>, FetchError> {
        let url = format!(
            "{}?parameters={}&latitude={}&longitude={}&start={}&end={}&format=JSON&community={}",
            self.base_url,
            PARAMETERS,
            coords.latitude,
            coords.longitude,
            window.start_param(),
            window.end_param(),
            self.community
        );

        tracing::info!(
            "Querying NASA POWER ({} to {}) for {}",
            window.start_param(),
            window.end_param(),
            coords.label()
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        let parameters = parse_payload(&body)?;
        samples_from_parameters(parameters)
    }
}

/// Extract the hourly parameter block from a response body
pub fn parse_payload(body: &str) -> Result<PowerParameters, FetchError> {
    let data: PowerResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(format!("invalid JSON: {}", e)))?;

    data.properties
        .and_then(|p| p.parameter)
        .ok_or_else(|| FetchError::Malformed("missing properties.parameter".to_string()))
}

/// Parse an hourly key such as "2024030717"
pub fn parse_hour_key(key: &str) -> Option<NaiveDateTime> {
    if key.len() != 10 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::parse_from_str(&key[..8], "%Y%m%d").ok()?;
    let hour: u32 = key[8..].parse().ok()?;
    date.and_hms_opt(hour, 0, 0)
}

/// Join the three hourly series on their timestamp.
///
/// An hour missing from any series becomes a sample carrying the missing
/// value, so the aggregator discards it like any other gap. A key that is
/// not a valid hour makes the whole payload malformed.
pub fn samples_from_parameters(
    parameters: PowerParameters,
) -> Result<Vec<HourlySample>, FetchError> {
    parameters
        .temperature
        .iter()
        .map(|(key, &temperature)| {
            let timestamp = parse_hour_key(key)
                .ok_or_else(|| FetchError::Malformed(format!("invalid hour key '{}'", key)))?;
            let humidity = parameters.humidity.get(key).copied().unwrap_or(MISSING_VALUE);
            let precipitation = parameters
                .precipitation
                .get(key)
                .copied()
                .unwrap_or(MISSING_VALUE);
            Ok(HourlySample::new(timestamp, temperature, humidity, precipitation))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hour_key() {
        let ts = parse_hour_key("2024030717").unwrap();
        assert_eq!(ts.to_string(), "2024-03-07 17:00:00");
        assert!(parse_hour_key("20240307").is_none());
        assert!(parse_hour_key("2024030724").is_none());
        assert!(parse_hour_key("2024023012").is_none());
        assert!(parse_hour_key("2024-03-07").is_none());
    }

    #[test]
    fn test_parse_payload_requires_parameter_block() {
        assert!(matches!(parse_payload("{}"), Err(FetchError::Malformed(_))));
        assert!(matches!(
            parse_payload(r#"{"properties":{}}"#),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(parse_payload("<html>"), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_series_are_joined_on_timestamp() {
        let body = r#"{
            "properties": {
                "parameter": {
                    "T2M": {"2024030700": 11.5, "2024030701": 10.9},
                    "RH2M": {"2024030700": 88.1},
                    "PRECTOTCORR": {"2024030700": 0.2, "2024030701": 0.0}
                }
            }
        }"#;
        let samples = samples_from_parameters(parse_payload(body).unwrap()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].temperature_celsius, 11.5);
        assert_eq!(samples[0].humidity_percent, 88.1);
        assert!(samples[0].is_complete());
        assert_eq!(samples[1].humidity_percent, MISSING_VALUE);
        assert!(!samples[1].is_complete());
    }

    #[test]
    fn test_bad_hour_key_is_malformed() {
        let body = r#"{"properties":{"parameter":{
            "T2M": {"bad": 11.5},
            "RH2M": {"bad": 88.1},
            "PRECTOTCORR": {"bad": 0.2}
        }}}"#;
        let result = samples_from_parameters(parse_payload(body).unwrap());
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }
}
