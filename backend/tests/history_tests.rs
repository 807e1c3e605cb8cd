//! Sensor history integration tests
//!
//! Tests for the daily counters store:
//! - accumulate-not-overwrite semantics
//! - derived averages on read
//! - CSV export
//!
//! Database-bound tests need `DATABASE_URL` and are ignored by default.

use chrono::NaiveDate;
use ecoguardian_backend::services::HistoryService;
use proptest::prelude::*;
use shared::{DailyHistory, SensorReading};
use sqlx::postgres::PgPoolOptions;

fn reading(t: f64, h: f64, p: f64) -> SensorReading {
    SensorReading {
        temperature_celsius: t,
        humidity_percent: h,
        precipitation_mm: p,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_day_without_readings_does_not_divide_by_zero() {
        let day = DailyHistory::empty(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        let summary = day.summary();
        assert_eq!(summary.mean_temperature_celsius, 0.0);
        assert_eq!(summary.readings, 0);
    }

    #[test]
    fn test_csv_has_one_row_per_day() {
        let days: Vec<_> = (1..=3)
            .map(|d| {
                let mut day = DailyHistory::empty(NaiveDate::from_ymd_opt(2024, 5, d).unwrap());
                day.accumulate(&reading(12.0 + d as f64, 85.0, 0.25));
                day.summary()
            })
            .collect();

        let csv = HistoryService::export_to_csv(&days).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "2024-05-03,15.0,85.0,0.25,1");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Folding readings in any order gives the same day
    #[test]
    fn prop_accumulation_is_order_independent(
        values in prop::collection::vec((0.0f64..40.0, 0.0f64..100.0, 0.0f64..50.0), 1..20),
    ) {
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let mut forward = DailyHistory::empty(day);
        let mut backward = DailyHistory::empty(day);
        for (t, h, p) in &values {
            forward.accumulate(&reading(*t, *h, *p));
        }
        for (t, h, p) in values.iter().rev() {
            backward.accumulate(&reading(*t, *h, *p));
        }

        let a = forward.summary();
        let b = backward.summary();
        prop_assert_eq!(a.readings, values.len() as i64);
        prop_assert!((a.mean_temperature_celsius - b.mean_temperature_celsius).abs() < 0.11);
        prop_assert!((a.mean_humidity_percent - b.mean_humidity_percent).abs() < 0.11);
    }

    /// The derived mean stays within the range of the readings
    #[test]
    fn prop_mean_within_reading_range(
        temps in prop::collection::vec(-10.0f64..40.0, 1..20),
    ) {
        let mut day = DailyHistory::empty(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        for t in &temps {
            day.accumulate(&reading(*t, 80.0, 0.0));
        }
        let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
        let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = day.summary().mean_temperature_celsius;
        prop_assert!(mean >= min - 0.05 && mean <= max + 0.05);
    }
}

// ============================================================================
// Database Tests
// ============================================================================

#[cfg(test)]
mod database_tests {
    use super::*;

    async fn connected_service() -> HistoryService {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        sqlx::query("DELETE FROM daily_history WHERE day = '1999-01-01'")
            .execute(&pool)
            .await
            .unwrap();
        HistoryService::new(Some(pool))
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_readings_accumulate_into_one_day() {
        let service = connected_service().await;
        let day = NaiveDate::from_ymd_opt(1999, 1, 1).unwrap();

        service.record_reading(day, &reading(14.0, 90.0, 0.5)).await.unwrap();
        service.record_reading(day, &reading(16.0, 80.0, 1.0)).await.unwrap();

        let stored = service
            .list_days()
            .await
            .unwrap()
            .into_iter()
            .find(|d| d.day == day)
            .unwrap();
        assert_eq!(stored.reading_count, 2);

        let summary = stored.summary();
        assert_eq!(summary.mean_temperature_celsius, 15.0);
        assert_eq!(summary.mean_humidity_percent, 85.0);
        assert_eq!(summary.total_precipitation_mm, 1.5);
        assert!(service.ping().await);
    }
}
