//! Common types used across the platform

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates of a monitored field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Human readable location, e.g. "Lat: -12.0464, Lon: -77.0428"
    pub fn label(&self) -> String {
        format!("Lat: {:.4}, Lon: {:.4}", self.latitude, self.longitude)
    }
}

/// Round a float to `dp` decimal places, half to even.
///
/// Rounds the exact binary value, so 2.675 (stored as 2.67499...) becomes
/// 2.67. Non-finite values are returned unchanged.
pub fn round_dp(value: f64, dp: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(dp))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
