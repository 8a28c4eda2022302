//! Collaborator traits the runner is written against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulsecheck_analysis::{SentimentSummary, Snippet, TrendPoint};
use pulsecheck_db::MonitorSubscriptionRow;
use uuid::Uuid;

use crate::error::MonitorError;
use crate::notify::NotificationRequest;

/// Multi-source snippet retrieval for one subject.
#[async_trait]
pub trait SnippetRetriever: Send + Sync {
    async fn search(&self, subject: &str) -> Result<Vec<Snippet>, MonitorError>;
}

/// Append-only trend history, keyed by subject and injected into the runner.
#[async_trait]
pub trait TrendStore: Send + Sync {
    /// Append a snapshot. Never overwrites existing history.
    async fn append(&self, point: &TrendPoint) -> Result<(), MonitorError>;

    /// Most-recent-first history for a subject, capped at `limit`.
    async fn recent(&self, subject: &str, limit: i64) -> Result<Vec<TrendPoint>, MonitorError>;
}

/// Subscription rows the sweep iterates and updates.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn list_active(&self) -> Result<Vec<MonitorSubscriptionRow>, MonitorError>;

    /// Record a completed run: `last_run_at` and `last_score`.
    async fn mark_run(
        &self,
        subscription_id: i64,
        last_run_at: DateTime<Utc>,
        last_score: i32,
    ) -> Result<(), MonitorError>;
}

/// Persists interactive analysis results.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn save(
        &self,
        owner_id: Option<Uuid>,
        summary: &SentimentSummary,
    ) -> Result<(), MonitorError>;
}

/// Delivers a notification over its enabled channels.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, request: &NotificationRequest) -> Result<(), MonitorError>;
}
