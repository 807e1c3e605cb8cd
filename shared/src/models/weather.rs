//! Weather observation models

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Reserved value the upstream source uses for a missing measurement
pub const MISSING_VALUE: f64 = -999.0;

/// Number of calendar days in an observation window
pub const WINDOW_DAYS: i64 = 7;

/// Days between the end of the window and today, so the upstream source has
/// finalized every day in the window
pub const WINDOW_LAG_DAYS: i64 = 2;

/// One hourly observation for a geographic point
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HourlySample {
    pub timestamp: NaiveDateTime,
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    pub precipitation_mm: f64,
}

impl HourlySample {
    pub fn new(
        timestamp: NaiveDateTime,
        temperature_celsius: f64,
        humidity_percent: f64,
        precipitation_mm: f64,
    ) -> Self {
        Self {
            timestamp,
            temperature_celsius,
            humidity_percent,
            precipitation_mm,
        }
    }

    /// A sample is usable only when all three measurements are present
    pub fn is_complete(&self) -> bool {
        [
            self.temperature_celsius,
            self.humidity_percent,
            self.precipitation_mm,
        ]
        .iter()
        .all(|v| v.is_finite() && *v != MISSING_VALUE)
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Reduction of one calendar day of valid hourly samples
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub mean_temperature_celsius: f64,
    pub mean_humidity_percent: f64,
    /// Accumulated over the day
    pub total_precipitation_mm: f64,
    pub sample_count: usize,
}

/// Equal-day-weighted summary of an observation window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklySummary {
    pub mean_temperature_celsius: f64,
    pub mean_humidity_percent: f64,
    /// Mean of the daily precipitation totals
    pub mean_daily_precipitation_mm: f64,
    pub period: String,
    pub days: usize,
}

/// Seven consecutive days ending `WINDOW_LAG_DAYS` before the reference date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObservationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ObservationWindow {
    /// Window whose requests run from `today - 8d` to `today - 2d` inclusive
    pub fn ending_before(today: NaiveDate) -> Self {
        let start = today - Duration::days(WINDOW_DAYS + WINDOW_LAG_DAYS - 1);
        let end = start + Duration::days(WINDOW_DAYS - 1);
        Self { start, end }
    }

    /// Compact form the upstream API expects, e.g. "20240101"
    pub fn start_param(&self) -> String {
        self.start.format("%Y%m%d").to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format("%Y%m%d").to_string()
    }

    /// Period label, e.g. "20240101 - 20240107"
    pub fn label(&self) -> String {
        format!("{} - {}", self.start_param(), self.end_param())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
