//! Postgres-backed collaborator implementations and the production retriever.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulsecheck_analysis::{
    collect_snippets, AnalysisConfig, Platform, SentimentSummary, Snippet, SnippetClassifier,
    TrendPoint,
};
use pulsecheck_db::{NewSentimentSummary, NewTrendPoint, TrendPointRow};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::MonitorError;
use crate::notify::{ChannelNotifier, EmailSettings};
use crate::ports::{SnippetRetriever, SubscriptionStore, SummaryStore, TrendStore};
use crate::runner::MonitorDeps;

fn persistence_err(e: impl std::fmt::Display) -> MonitorError {
    MonitorError::Persistence(e.to_string())
}

/// Live retriever: fans out over the configured web sources.
pub struct WebRetriever {
    config: AnalysisConfig,
}

impl WebRetriever {
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SnippetRetriever for WebRetriever {
    async fn search(&self, subject: &str) -> Result<Vec<Snippet>, MonitorError> {
        // Per-source failures are already absorbed inside the fan-out; an
        // all-sources failure shows up as an empty batch, not an error.
        Ok(collect_snippets(&self.config, subject).await)
    }
}

/// Trend history in the `trend_points` table.
pub struct PgTrendStore {
    pool: PgPool,
}

impl PgTrendStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrendStore for PgTrendStore {
    async fn append(&self, point: &TrendPoint) -> Result<(), MonitorError> {
        let new = NewTrendPoint {
            subject: point.subject.clone(),
            positive_ratio: point.positive_ratio,
            negative_ratio: point.negative_ratio,
            neutral_ratio: point.neutral_ratio,
            overall_score: point.overall_score,
            platform_counts: serde_json::to_value(&point.platform_counts)
                .map_err(persistence_err)?,
            total_count: i32::try_from(point.total_count).unwrap_or(i32::MAX),
            recorded_at: point.recorded_at,
        };
        pulsecheck_db::insert_trend_point(&self.pool, &new)
            .await
            .map_err(persistence_err)?;
        Ok(())
    }

    async fn recent(&self, subject: &str, limit: i64) -> Result<Vec<TrendPoint>, MonitorError> {
        let rows = pulsecheck_db::list_trend_points(&self.pool, subject, limit)
            .await
            .map_err(persistence_err)?;
        Ok(rows.into_iter().map(trend_point_from_row).collect())
    }
}

fn trend_point_from_row(row: TrendPointRow) -> TrendPoint {
    let platform_counts: BTreeMap<Platform, usize> =
        serde_json::from_value(row.platform_counts).unwrap_or_default();
    TrendPoint {
        subject: row.subject,
        positive_ratio: row.positive_ratio,
        negative_ratio: row.negative_ratio,
        neutral_ratio: row.neutral_ratio,
        overall_score: row.overall_score,
        platform_counts,
        total_count: usize::try_from(row.total_count).unwrap_or(0),
        recorded_at: row.recorded_at,
    }
}

/// Subscription rows in the `monitor_subscriptions` table.
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn list_active(
        &self,
    ) -> Result<Vec<pulsecheck_db::MonitorSubscriptionRow>, MonitorError> {
        pulsecheck_db::list_active_subscriptions(&self.pool)
            .await
            .map_err(persistence_err)
    }

    async fn mark_run(
        &self,
        subscription_id: i64,
        last_run_at: DateTime<Utc>,
        last_score: i32,
    ) -> Result<(), MonitorError> {
        pulsecheck_db::mark_subscription_run(&self.pool, subscription_id, last_run_at, last_score)
            .await
            .map_err(persistence_err)
    }
}

/// Summary rows in the `sentiment_summaries` table.
pub struct PgSummaryStore {
    pool: PgPool,
}

impl PgSummaryStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryStore for PgSummaryStore {
    async fn save(
        &self,
        owner_id: Option<Uuid>,
        summary: &SentimentSummary,
    ) -> Result<(), MonitorError> {
        let new = NewSentimentSummary {
            owner_id,
            subject: summary.subject.clone(),
            overall: summary.overall.to_string(),
            positive_ratio: summary.positive_ratio,
            negative_ratio: summary.negative_ratio,
            neutral_ratio: summary.neutral_ratio,
            narrative: summary.narrative.clone(),
            key_themes: serde_json::to_value(&summary.key_themes).map_err(persistence_err)?,
            exemplars: serde_json::to_value(&summary.exemplars).map_err(persistence_err)?,
            total_analyzed: i32::try_from(summary.total_analyzed).unwrap_or(i32::MAX),
            source_breakdown: serde_json::to_value(&summary.source_breakdown)
                .map_err(persistence_err)?,
        };
        pulsecheck_db::insert_sentiment_summary(&self.pool, &new)
            .await
            .map_err(persistence_err)?;
        Ok(())
    }
}

/// Wire the production dependency set from a pool and app config.
#[must_use]
pub fn pg_deps(pool: PgPool, config: &pulsecheck_core::AppConfig) -> MonitorDeps {
    let analysis_config = AnalysisConfig::from_app_config(config);
    let classifier = SnippetClassifier::from_config(&analysis_config);
    let email = EmailSettings::from_app_config(config);

    MonitorDeps {
        retriever: Arc::new(WebRetriever::new(analysis_config)),
        classifier,
        trends: Arc::new(PgTrendStore::new(pool.clone())),
        subscriptions: Arc::new(PgSubscriptionStore::new(pool.clone())),
        summaries: Arc::new(PgSummaryStore::new(pool.clone())),
        notifier: Arc::new(ChannelNotifier::new(pool, email)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_row_round_trips_platform_counts() {
        let row = TrendPointRow {
            id: 1,
            subject: "widget".to_string(),
            positive_ratio: 55,
            negative_ratio: 25,
            neutral_ratio: 20,
            overall_score: 55,
            platform_counts: serde_json::json!({"reddit": 2, "news": 5}),
            total_count: 7,
            recorded_at: Utc::now(),
            created_at: Utc::now(),
        };
        let point = trend_point_from_row(row);
        assert_eq!(point.platform_counts[&Platform::Reddit], 2);
        assert_eq!(point.platform_counts[&Platform::News], 5);
        assert_eq!(point.total_count, 7);
    }

    #[test]
    fn malformed_platform_counts_degrade_to_empty() {
        let row = TrendPointRow {
            id: 1,
            subject: "widget".to_string(),
            positive_ratio: 50,
            negative_ratio: 30,
            neutral_ratio: 20,
            overall_score: 50,
            platform_counts: serde_json::json!("not-an-object"),
            total_count: 4,
            recorded_at: Utc::now(),
            created_at: Utc::now(),
        };
        let point = trend_point_from_row(row);
        assert!(point.platform_counts.is_empty());
    }
}
