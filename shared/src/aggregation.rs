//! Temporal aggregation of hourly observations into a weekly summary
//!
//! Hourly samples are filtered, bucketed by calendar day, reduced per day
//! (means for temperature and humidity, a sum for precipitation) and then
//! averaged across days with equal weight. Rounding happens once, on output.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DailyAggregate, HourlySample, ObservationWindow, WeeklySummary};
use crate::types::round_dp;

/// Decimal places kept in a weekly summary
pub const SUMMARY_PRECISION: u32 = 2;

/// Reduce each calendar day of complete samples.
///
/// Incomplete samples are dropped entirely. Days are returned in date order,
/// and a day only appears if at least one of its samples survived.
pub fn aggregate_daily(samples: &[HourlySample]) -> Vec<DailyAggregate> {
    let mut days: BTreeMap<NaiveDate, (f64, f64, f64, usize)> = BTreeMap::new();

    for sample in samples.iter().filter(|s| s.is_complete()) {
        let entry = days.entry(sample.date()).or_insert((0.0, 0.0, 0.0, 0));
        entry.0 += sample.temperature_celsius;
        entry.1 += sample.humidity_percent;
        entry.2 += sample.precipitation_mm;
        entry.3 += 1;
    }

    days.into_iter()
        .map(|(date, (temp_sum, hum_sum, precip_sum, count))| DailyAggregate {
            date,
            mean_temperature_celsius: temp_sum / count as f64,
            mean_humidity_percent: hum_sum / count as f64,
            total_precipitation_mm: precip_sum,
            sample_count: count,
        })
        .collect()
}

/// Average daily aggregates with equal weight per day, unrounded.
///
/// Returns `None` when there are no days.
pub fn summarize_days(days: &[DailyAggregate]) -> Option<(f64, f64, f64)> {
    if days.is_empty() {
        return None;
    }

    let n = days.len() as f64;
    let (t, h, p) = days.iter().fold((0.0, 0.0, 0.0), |(t, h, p), day| {
        (
            t + day.mean_temperature_celsius,
            h + day.mean_humidity_percent,
            p + day.total_precipitation_mm,
        )
    });

    Some((t / n, h / n, p / n))
}

/// Aggregate raw hourly samples into the weekly summary for `window`.
///
/// Returns `None` ("data unavailable") when no sample survives filtering;
/// an absent summary is never zero-filled.
pub fn aggregate_weekly(
    samples: &[HourlySample],
    window: &ObservationWindow,
) -> Option<WeeklySummary> {
    let days = aggregate_daily(samples);
    let (temperature, humidity, precipitation) = summarize_days(&days)?;

    Some(WeeklySummary {
        mean_temperature_celsius: round_dp(temperature, SUMMARY_PRECISION),
        mean_humidity_percent: round_dp(humidity, SUMMARY_PRECISION),
        mean_daily_precipitation_mm: round_dp(precipitation, SUMMARY_PRECISION),
        period: window.label(),
        days: days.len(),
    })
}
