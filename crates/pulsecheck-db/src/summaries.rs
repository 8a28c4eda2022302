//! Database operations for the `sentiment_summaries` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `sentiment_summaries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SentimentSummaryRow {
    pub id: i64,
    pub public_id: Uuid,
    pub owner_id: Option<Uuid>,
    pub subject: String,
    pub overall: String,
    pub positive_ratio: i32,
    pub negative_ratio: i32,
    pub neutral_ratio: i32,
    pub narrative: String,
    pub key_themes: Value,
    pub exemplars: Value,
    pub total_analyzed: i32,
    pub source_breakdown: Value,
    pub created_at: DateTime<Utc>,
}

/// Values for a new summary row. JSON fields hold the serialized theme list,
/// exemplar buckets, and platform breakdown.
#[derive(Debug, Clone)]
pub struct NewSentimentSummary {
    pub owner_id: Option<Uuid>,
    pub subject: String,
    pub overall: String,
    pub positive_ratio: i32,
    pub negative_ratio: i32,
    pub neutral_ratio: i32,
    pub narrative: String,
    pub key_themes: Value,
    pub exemplars: Value,
    pub total_analyzed: i32,
    pub source_breakdown: Value,
}

const SUMMARY_COLUMNS: &str = "id, public_id, owner_id, subject, overall, positive_ratio, \
     negative_ratio, neutral_ratio, narrative, key_themes, exemplars, total_analyzed, \
     source_breakdown, created_at";

/// Insert a summary row and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_sentiment_summary(
    pool: &PgPool,
    new: &NewSentimentSummary,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO sentiment_summaries \
             (owner_id, subject, overall, positive_ratio, negative_ratio, neutral_ratio, \
              narrative, key_themes, exemplars, total_analyzed, source_breakdown) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING id",
    )
    .bind(new.owner_id)
    .bind(&new.subject)
    .bind(&new.overall)
    .bind(new.positive_ratio)
    .bind(new.negative_ratio)
    .bind(new.neutral_ratio)
    .bind(&new.narrative)
    .bind(&new.key_themes)
    .bind(&new.exemplars)
    .bind(new.total_analyzed)
    .bind(&new.source_breakdown)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// List recent summaries, optionally filtered by owner, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_summaries(
    pool: &PgPool,
    owner_id: Option<Uuid>,
    limit: i64,
) -> Result<Vec<SentimentSummaryRow>, DbError> {
    let rows = match owner_id {
        Some(owner) => {
            sqlx::query_as::<_, SentimentSummaryRow>(&format!(
                "SELECT {SUMMARY_COLUMNS} \
                 FROM sentiment_summaries \
                 WHERE owner_id = $1 \
                 ORDER BY created_at DESC, id DESC \
                 LIMIT $2"
            ))
            .bind(owner)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, SentimentSummaryRow>(&format!(
                "SELECT {SUMMARY_COLUMNS} \
                 FROM sentiment_summaries \
                 ORDER BY created_at DESC, id DESC \
                 LIMIT $1"
            ))
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}
