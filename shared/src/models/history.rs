//! Daily sensor history counters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::round_dp;

/// Running totals for one calendar day of sensor readings.
///
/// Writes accumulate into these counters; averages are only derived on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyHistory {
    pub day: NaiveDate,
    pub temp_sum: f64,
    pub hum_sum: f64,
    pub precip_total: f64,
    pub reading_count: i64,
}

/// A single sensor reading to fold into a day's counters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SensorReading {
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    pub precipitation_mm: f64,
}

/// Read-side view of a day, as served to the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyHistorySummary {
    #[serde(rename = "fecha")]
    pub day: NaiveDate,
    #[serde(rename = "temperatura")]
    pub mean_temperature_celsius: f64,
    #[serde(rename = "humedad")]
    pub mean_humidity_percent: f64,
    #[serde(rename = "precipitacion")]
    pub total_precipitation_mm: f64,
    #[serde(rename = "lecturas")]
    pub readings: i64,
}

impl DailyHistory {
    pub fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            temp_sum: 0.0,
            hum_sum: 0.0,
            precip_total: 0.0,
            reading_count: 0,
        }
    }

    /// Fold one reading in, the same way the store's upsert does
    pub fn accumulate(&mut self, reading: &SensorReading) {
        self.temp_sum += reading.temperature_celsius;
        self.hum_sum += reading.humidity_percent;
        self.precip_total += reading.precipitation_mm;
        self.reading_count += 1;
    }

    /// Means rounded to 1 dp, precipitation total rounded to 2 dp.
    /// A count of zero is treated as one.
    pub fn summary(&self) -> DailyHistorySummary {
        let count = self.reading_count.max(1) as f64;
        DailyHistorySummary {
            day: self.day,
            mean_temperature_celsius: round_dp(self.temp_sum / count, 1),
            mean_humidity_percent: round_dp(self.hum_sum / count, 1),
            total_precipitation_mm: round_dp(self.precip_total, 2),
            readings: self.reading_count,
        }
    }
}
