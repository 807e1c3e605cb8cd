//! Sensor history service
//!
//! Keeps per-day running totals of sensor readings. Writes accumulate into the
//! day's counters; averages are derived when reading back.

use chrono::NaiveDate;
use serde::Serialize;
use shared::{DailyHistory, SensorReading};
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};

/// Sensor history service
#[derive(Clone)]
pub struct HistoryService {
    db: Option<PgPool>,
}

/// Daily counters row
#[derive(Debug, Clone, FromRow)]
struct DailyHistoryRow {
    day: NaiveDate,
    temp_sum: f64,
    hum_sum: f64,
    precip_total: f64,
    reading_count: i64,
}

impl From<DailyHistoryRow> for DailyHistory {
    fn from(row: DailyHistoryRow) -> Self {
        DailyHistory {
            day: row.day,
            temp_sum: row.temp_sum,
            hum_sum: row.hum_sum,
            precip_total: row.precip_total,
            reading_count: row.reading_count,
        }
    }
}

impl HistoryService {
    /// Create a new HistoryService; `None` disables storage
    pub fn new(db: Option<PgPool>) -> Self {
        Self { db }
    }

    pub fn is_connected(&self) -> bool {
        self.db.is_some()
    }

    /// Whether the database answers a trivial query
    pub async fn ping(&self) -> bool {
        match &self.db {
            Some(db) => sqlx::query("SELECT 1").execute(db).await.is_ok(),
            None => false,
        }
    }

    fn pool(&self) -> AppResult<&PgPool> {
        self.db.as_ref().ok_or(AppError::StorageUnavailable)
    }

    /// Add a reading to the counters of `day`
    pub async fn record_reading(&self, day: NaiveDate, reading: &SensorReading) -> AppResult<()> {
        let db = self.pool()?;

        sqlx::query(
            r#"
            INSERT INTO daily_history (day, temp_sum, hum_sum, precip_total, reading_count, updated_at)
            VALUES ($1, $2, $3, $4, 1, NOW())
            ON CONFLICT (day) DO UPDATE SET
                temp_sum = daily_history.temp_sum + EXCLUDED.temp_sum,
                hum_sum = daily_history.hum_sum + EXCLUDED.hum_sum,
                precip_total = daily_history.precip_total + EXCLUDED.precip_total,
                reading_count = daily_history.reading_count + 1,
                updated_at = NOW()
            "#,
        )
        .bind(day)
        .bind(reading.temperature_celsius)
        .bind(reading.humidity_percent)
        .bind(reading.precipitation_mm)
        .execute(db)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record sensor reading for {}: {}", day, e);
            AppError::DatabaseError(e)
        })?;

        tracing::info!("Sensor reading added to history for {}", day);
        Ok(())
    }

    /// All stored days, oldest first
    pub async fn list_days(&self) -> AppResult<Vec<DailyHistory>> {
        let db = self.pool()?;

        let rows = sqlx::query_as::<_, DailyHistoryRow>(
            r#"
            SELECT day, temp_sum, hum_sum, precip_total, reading_count
            FROM daily_history
            ORDER BY day
            "#,
        )
        .fetch_all(db)
        .await?;

        Ok(rows.into_iter().map(DailyHistory::from).collect())
    }

    /// Export rows as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
