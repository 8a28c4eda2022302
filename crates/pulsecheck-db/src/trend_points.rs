//! Database operations for the append-only `trend_points` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `trend_points` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendPointRow {
    pub id: i64,
    pub subject: String,
    pub positive_ratio: i32,
    pub negative_ratio: i32,
    pub neutral_ratio: i32,
    pub overall_score: i32,
    pub platform_counts: Value,
    pub total_count: i32,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Values for a new trend point. `platform_counts` must be a JSON object.
#[derive(Debug, Clone)]
pub struct NewTrendPoint {
    pub subject: String,
    pub positive_ratio: i32,
    pub negative_ratio: i32,
    pub neutral_ratio: i32,
    pub overall_score: i32,
    pub platform_counts: Value,
    pub total_count: i32,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

const TREND_POINT_COLUMNS: &str = "id, subject, positive_ratio, negative_ratio, neutral_ratio, \
     overall_score, platform_counts, total_count, recorded_at, created_at";

/// Append a trend point and return its generated id. Rows are never updated
/// or deleted; history only grows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_trend_point(pool: &PgPool, point: &NewTrendPoint) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO trend_points \
             (subject, positive_ratio, negative_ratio, neutral_ratio, \
              overall_score, platform_counts, total_count, recorded_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id",
    )
    .bind(&point.subject)
    .bind(point.positive_ratio)
    .bind(point.negative_ratio)
    .bind(point.neutral_ratio)
    .bind(point.overall_score)
    .bind(&point.platform_counts)
    .bind(point.total_count)
    .bind(point.recorded_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// List a subject's trend points, most recent first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trend_points(
    pool: &PgPool,
    subject: &str,
    limit: i64,
) -> Result<Vec<TrendPointRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendPointRow>(&format!(
        "SELECT {TREND_POINT_COLUMNS} \
         FROM trend_points \
         WHERE subject = $1 \
         ORDER BY recorded_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(subject)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Return the most recent trend point for a subject, or `None` if none exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_latest_trend_point(
    pool: &PgPool,
    subject: &str,
) -> Result<Option<TrendPointRow>, DbError> {
    let row = sqlx::query_as::<_, TrendPointRow>(&format!(
        "SELECT {TREND_POINT_COLUMNS} \
         FROM trend_points \
         WHERE subject = $1 \
         ORDER BY recorded_at DESC, id DESC \
         LIMIT 1"
    ))
    .bind(subject)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
