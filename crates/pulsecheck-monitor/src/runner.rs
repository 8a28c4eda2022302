//! Run orchestration: interactive analysis, per-subscription runs, and the
//! monitoring sweep.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pulsecheck_analysis::{
    analyze_snippets, compute_change, trend_point_from_summary, ChangeEvent, SentimentSummary,
    SnippetClassifier, TrendPoint,
};
use pulsecheck_core::{validate_subject, Cadence};
use pulsecheck_db::MonitorSubscriptionRow;
use uuid::Uuid;

use crate::error::MonitorError;
use crate::notify::change_notification;
use crate::ports::{Notifier, SnippetRetriever, SubscriptionStore, SummaryStore, TrendStore};
use crate::schedule::is_due;

/// Default history window for trend reads.
pub const DEFAULT_TREND_LIMIT: i64 = 30;

/// Injected collaborators the runner operates through.
pub struct MonitorDeps {
    pub retriever: Arc<dyn SnippetRetriever>,
    pub classifier: SnippetClassifier,
    pub trends: Arc<dyn TrendStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub summaries: Arc<dyn SummaryStore>,
    pub notifier: Arc<dyn Notifier>,
}

/// Outcome of one subscription run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Pipeline completed; a change event is present when the swing crossed
    /// the subscription's threshold.
    Completed { change: Option<ChangeEvent> },
    /// Retrieval produced no candidates: nothing recorded, nothing updated.
    NoData,
    /// The cadence interval has not elapsed yet.
    NotDue,
}

/// One subscription's entry in a sweep report.
#[derive(Debug)]
pub struct SweepOutcome {
    pub subscription_id: i64,
    pub subject: String,
    pub result: Result<RunOutcome, MonitorError>,
}

/// Per-subscription outcomes of one sweep, inspectable as a whole.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub outcomes: Vec<SweepOutcome>,
}

impl SweepReport {
    #[must_use]
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, RunOutcome::Completed { .. }))
    }

    #[must_use]
    pub fn no_data(&self) -> usize {
        self.count(|o| matches!(o, RunOutcome::NoData))
    }

    #[must_use]
    pub fn not_due(&self) -> usize {
        self.count(|o| matches!(o, RunOutcome::NotDue))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    fn count(&self, pred: impl Fn(&RunOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .filter(|o| pred(o))
            .count()
    }
}

/// Outcome of an interactive analysis request.
#[derive(Debug)]
pub enum AnalyzeOutcome {
    /// Retrieval produced no candidates; nothing was recorded.
    NoData,
    /// The summary is always returned; `save_error` reports persistence
    /// problems separately instead of discarding the computed result.
    Completed {
        summary: SentimentSummary,
        save_error: Option<String>,
    },
}

/// Interactive analysis of one subject.
///
/// Validation problems surface immediately; retrieval and classification
/// plumbing never does. A retriever error degrades to the no-data signal, and
/// a failed trend append or summary save is reported in `save_error`
/// alongside the summary rather than rolling the result back.
///
/// # Errors
///
/// Returns [`MonitorError::Validation`] for an empty or oversized subject.
pub async fn analyze_subject(
    deps: &MonitorDeps,
    subject: &str,
    owner_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<AnalyzeOutcome, MonitorError> {
    validate_subject(subject)?;

    let raw = match deps.retriever.search(subject).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(subject, error = %e, "retrieval failed; reporting no data");
            Vec::new()
        }
    };

    let Some(summary) = analyze_snippets(&deps.classifier, subject, raw).await else {
        return Ok(AnalyzeOutcome::NoData);
    };

    let mut save_errors: Vec<String> = Vec::new();

    let point = trend_point_from_summary(&summary, now);
    if let Err(e) = deps.trends.append(&point).await {
        tracing::warn!(subject, error = %e, "trend append failed for interactive analysis");
        save_errors.push(e.to_string());
    }
    if let Err(e) = deps.summaries.save(owner_id, &summary).await {
        tracing::warn!(subject, error = %e, "summary save failed for interactive analysis");
        save_errors.push(e.to_string());
    }

    Ok(AnalyzeOutcome::Completed {
        summary,
        save_error: if save_errors.is_empty() {
            None
        } else {
            Some(save_errors.join("; "))
        },
    })
}

/// Read a subject's trend history, most recent first.
///
/// # Errors
///
/// Returns [`MonitorError::Validation`] for a bad subject or
/// [`MonitorError::Persistence`] if the store read fails.
pub async fn get_trend(
    deps: &MonitorDeps,
    subject: &str,
    limit: Option<i64>,
) -> Result<Vec<TrendPoint>, MonitorError> {
    validate_subject(subject)?;
    deps.trends
        .recent(subject, limit.unwrap_or(DEFAULT_TREND_LIMIT))
        .await
}

/// Execute one subscription's pipeline at `now`.
///
/// Retrieval → dedup/classify → record snapshot → compare against the
/// subscription's `last_score` → update `last_run_at`/`last_score`
/// unconditionally → notify when the change crossed the threshold and at
/// least one channel is enabled. Zero candidates short-circuit before any
/// write. Notification delivery failures are logged, never propagated.
///
/// # Errors
///
/// Returns [`MonitorError::Retrieval`] or [`MonitorError::Persistence`] when
/// the respective collaborator fails; the caller treats either as this one
/// subscription's failure.
pub async fn run_one(
    deps: &MonitorDeps,
    subscription: &MonitorSubscriptionRow,
    now: DateTime<Utc>,
) -> Result<RunOutcome, MonitorError> {
    let raw = deps.retriever.search(&subscription.subject).await?;

    let Some(summary) = analyze_snippets(&deps.classifier, &subscription.subject, raw).await
    else {
        tracing::info!(subject = %subscription.subject, "no data this run; leaving subscription untouched");
        return Ok(RunOutcome::NoData);
    };

    let point = trend_point_from_summary(&summary, now);
    deps.trends.append(&point).await?;

    let change = compute_change(
        &subscription.subject,
        subscription.last_score,
        point.overall_score,
        subscription.change_threshold_percent,
    );

    deps.subscriptions
        .mark_run(subscription.id, now, point.overall_score)
        .await?;

    if let Some(event) = &change {
        if subscription.notify_by_email || subscription.notify_in_app {
            let request = change_notification(subscription, event);
            if let Err(e) = deps.notifier.deliver(&request).await {
                tracing::warn!(
                    subject = %subscription.subject,
                    error = %e,
                    "notification delivery failed"
                );
            }
        } else {
            tracing::debug!(
                subject = %subscription.subject,
                magnitude = event.magnitude,
                "significant change but no notification channel enabled"
            );
        }
    }

    Ok(RunOutcome::Completed { change })
}

/// Run every subscription in the slice, collecting one outcome per row.
///
/// Not-due subscriptions are recorded as [`RunOutcome::NotDue`]. A failure in
/// one subscription is caught, logged, and recorded without aborting the
/// rest; subscriptions share no mutable state and are processed
/// independently.
pub async fn run_all(
    deps: &MonitorDeps,
    subscriptions: &[MonitorSubscriptionRow],
    now: DateTime<Utc>,
) -> SweepReport {
    let mut report = SweepReport::default();

    for subscription in subscriptions {
        let result = match subscription.cadence.parse::<Cadence>() {
            Err(e) => {
                tracing::error!(
                    subject = %subscription.subject,
                    cadence = %subscription.cadence,
                    "subscription has an unparseable cadence"
                );
                Err(MonitorError::Validation(e))
            }
            Ok(cadence) if !is_due(cadence, subscription.last_run_at, now) => {
                Ok(RunOutcome::NotDue)
            }
            Ok(_) => match run_one(deps, subscription, now).await {
                Ok(outcome) => Ok(outcome),
                Err(e) => {
                    tracing::error!(
                        subject = %subscription.subject,
                        error = %e,
                        "subscription run failed"
                    );
                    Err(e)
                }
            },
        };

        report.outcomes.push(SweepOutcome {
            subscription_id: subscription.id,
            subject: subscription.subject.clone(),
            result,
        });
    }

    tracing::info!(
        total = report.outcomes.len(),
        completed = report.completed(),
        no_data = report.no_data(),
        not_due = report.not_due(),
        failed = report.failed(),
        "monitoring sweep finished"
    );

    report
}

/// Load the active subscriptions and run them all at the current time.
///
/// # Errors
///
/// Returns [`MonitorError::Persistence`] only when the subscription list
/// itself cannot be loaded; individual run failures stay inside the report.
pub async fn run_monitoring_sweep(deps: &MonitorDeps) -> Result<SweepReport, MonitorError> {
    let subscriptions = deps.subscriptions.list_active().await?;
    if subscriptions.is_empty() {
        tracing::info!("no active subscriptions; sweep is a no-op");
        return Ok(SweepReport::default());
    }
    Ok(run_all(deps, &subscriptions, Utc::now()).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationRequest;
    use async_trait::async_trait;
    use pulsecheck_analysis::{Platform, Snippet};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    fn snippet(text: &str) -> Snippet {
        Snippet {
            text: text.to_string(),
            source_label: "test".to_string(),
            author: None,
            url: None,
            platform: Platform::News,
        }
    }

    fn positive_batch() -> Vec<Snippet> {
        vec![
            snippet("this drink is great and I love the flavor"),
            snippet("excellent can design and a really good taste"),
        ]
    }

    fn subscription(
        id: i64,
        subject: &str,
        last_score: Option<i32>,
        threshold: i32,
    ) -> MonitorSubscriptionRow {
        MonitorSubscriptionRow {
            id,
            public_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            subject: subject.to_string(),
            is_active: true,
            cadence: "daily".to_string(),
            change_threshold_percent: threshold,
            notify_by_email: false,
            notify_in_app: true,
            last_run_at: None,
            last_score,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Retriever serving canned batches per subject; listed subjects fail.
    #[derive(Default)]
    struct FakeRetriever {
        batches: HashMap<String, Vec<Snippet>>,
        failing: HashSet<String>,
    }

    #[async_trait]
    impl SnippetRetriever for FakeRetriever {
        async fn search(&self, subject: &str) -> Result<Vec<Snippet>, MonitorError> {
            if self.failing.contains(subject) {
                return Err(MonitorError::Retrieval("source exploded".to_string()));
            }
            Ok(self.batches.get(subject).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct MemoryTrendStore {
        points: Mutex<Vec<TrendPoint>>,
        fail_append: bool,
    }

    #[async_trait]
    impl TrendStore for MemoryTrendStore {
        async fn append(&self, point: &TrendPoint) -> Result<(), MonitorError> {
            if self.fail_append {
                return Err(MonitorError::Persistence("append refused".to_string()));
            }
            self.points.lock().unwrap().push(point.clone());
            Ok(())
        }

        async fn recent(&self, subject: &str, limit: i64) -> Result<Vec<TrendPoint>, MonitorError> {
            let mut points: Vec<TrendPoint> = self
                .points
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.subject == subject)
                .cloned()
                .collect();
            points.reverse();
            points.truncate(usize::try_from(limit).unwrap_or(0));
            Ok(points)
        }
    }

    #[derive(Default)]
    struct MemorySubscriptionStore {
        runs: Mutex<Vec<(i64, i32)>>,
    }

    #[async_trait]
    impl SubscriptionStore for MemorySubscriptionStore {
        async fn list_active(&self) -> Result<Vec<MonitorSubscriptionRow>, MonitorError> {
            Ok(Vec::new())
        }

        async fn mark_run(
            &self,
            subscription_id: i64,
            _last_run_at: DateTime<Utc>,
            last_score: i32,
        ) -> Result<(), MonitorError> {
            self.runs.lock().unwrap().push((subscription_id, last_score));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemorySummaryStore {
        saved: Mutex<usize>,
        fail_save: bool,
    }

    #[async_trait]
    impl SummaryStore for MemorySummaryStore {
        async fn save(
            &self,
            _owner_id: Option<Uuid>,
            _summary: &SentimentSummary,
        ) -> Result<(), MonitorError> {
            if self.fail_save {
                return Err(MonitorError::Persistence("save refused".to_string()));
            }
            *self.saved.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        delivered: Mutex<Vec<NotificationRequest>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, request: &NotificationRequest) -> Result<(), MonitorError> {
            self.delivered.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    struct Fixture {
        deps: MonitorDeps,
        trends: Arc<MemoryTrendStore>,
        subscriptions: Arc<MemorySubscriptionStore>,
        summaries: Arc<MemorySummaryStore>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture(retriever: FakeRetriever) -> Fixture {
        fixture_with(retriever, MemoryTrendStore::default(), MemorySummaryStore::default())
    }

    fn fixture_with(
        retriever: FakeRetriever,
        trend_store: MemoryTrendStore,
        summary_store: MemorySummaryStore,
    ) -> Fixture {
        let trends = Arc::new(trend_store);
        let subscriptions = Arc::new(MemorySubscriptionStore::default());
        let summaries = Arc::new(summary_store);
        let notifier = Arc::new(RecordingNotifier::default());
        let deps = MonitorDeps {
            retriever: Arc::new(retriever),
            classifier: SnippetClassifier::new(None),
            trends: Arc::clone(&trends) as Arc<dyn TrendStore>,
            subscriptions: Arc::clone(&subscriptions) as Arc<dyn SubscriptionStore>,
            summaries: Arc::clone(&summaries) as Arc<dyn SummaryStore>,
            notifier: Arc::clone(&notifier) as Arc<dyn Notifier>,
        };
        Fixture {
            deps,
            trends,
            subscriptions,
            summaries,
            notifier,
        }
    }

    #[tokio::test]
    async fn run_one_records_snapshot_and_notifies_on_crossing() {
        let mut retriever = FakeRetriever::default();
        retriever
            .batches
            .insert("Fizzy Cola".to_string(), positive_batch());
        let fx = fixture(retriever);

        // Fallback classifies both snippets positive: score 100 vs baseline 50.
        let sub = subscription(7, "Fizzy Cola", Some(50), 20);
        let outcome = run_one(&fx.deps, &sub, Utc::now()).await.unwrap();

        let RunOutcome::Completed { change } = outcome else {
            panic!("expected Completed, got {outcome:?}");
        };
        let event = change.expect("50 -> 100 crosses a threshold of 20");
        assert_eq!(event.magnitude, 50);

        assert_eq!(fx.trends.points.lock().unwrap().len(), 1);
        assert_eq!(*fx.subscriptions.runs.lock().unwrap(), vec![(7, 100)]);
        let delivered = fx.notifier.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].in_app);
    }

    #[tokio::test]
    async fn run_one_updates_subscription_even_without_significant_change() {
        let mut retriever = FakeRetriever::default();
        retriever
            .batches
            .insert("Fizzy Cola".to_string(), positive_batch());
        let fx = fixture(retriever);

        let sub = subscription(3, "Fizzy Cola", Some(95), 20);
        let outcome = run_one(&fx.deps, &sub, Utc::now()).await.unwrap();

        assert!(matches!(outcome, RunOutcome::Completed { change: None }));
        assert_eq!(
            *fx.subscriptions.runs.lock().unwrap(),
            vec![(3, 100)],
            "last_run_at/last_score update is unconditional"
        );
        assert!(fx.notifier.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_one_short_circuits_on_zero_candidates() {
        let fx = fixture(FakeRetriever::default());

        let sub = subscription(9, "Unknown Gadget", Some(40), 10);
        let outcome = run_one(&fx.deps, &sub, Utc::now()).await.unwrap();

        assert!(matches!(outcome, RunOutcome::NoData));
        assert!(fx.trends.points.lock().unwrap().is_empty(), "no snapshot");
        assert!(
            fx.subscriptions.runs.lock().unwrap().is_empty(),
            "subscription fields unchanged"
        );
        assert!(fx.notifier.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_all_isolates_a_failing_subscription() {
        let mut retriever = FakeRetriever::default();
        retriever.batches.insert("Alpha".to_string(), positive_batch());
        retriever.batches.insert("Gamma".to_string(), positive_batch());
        retriever.failing.insert("Beta".to_string());
        let fx = fixture(retriever);

        let subs = vec![
            subscription(1, "Alpha", None, 10),
            subscription(2, "Beta", None, 10),
            subscription(3, "Gamma", None, 10),
        ];
        let report = run_all(&fx.deps, &subs, Utc::now()).await;

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.completed(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.outcomes[1].result.is_err(), "Beta failed");

        let runs = fx.subscriptions.runs.lock().unwrap();
        let updated: Vec<i64> = runs.iter().map(|(id, _)| *id).collect();
        assert_eq!(updated, vec![1, 3], "the other two still completed");
    }

    #[tokio::test]
    async fn run_all_skips_subscriptions_that_are_not_due() {
        let mut retriever = FakeRetriever::default();
        retriever.batches.insert("Alpha".to_string(), positive_batch());
        let fx = fixture(retriever);

        let mut sub = subscription(1, "Alpha", Some(50), 10);
        sub.last_run_at = Some(Utc::now() - chrono::Duration::hours(2));
        let report = run_all(&fx.deps, &[sub], Utc::now()).await;

        assert_eq!(report.not_due(), 1);
        assert!(fx.subscriptions.runs.lock().unwrap().is_empty());
        assert!(fx.trends.points.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn analyze_rejects_invalid_subjects_before_any_work() {
        let fx = fixture(FakeRetriever::default());
        let result = analyze_subject(&fx.deps, "  ", None, Utc::now()).await;
        assert!(matches!(result, Err(MonitorError::Validation(_))));
    }

    #[tokio::test]
    async fn analyze_degrades_retrieval_failure_to_no_data() {
        let mut retriever = FakeRetriever::default();
        retriever.failing.insert("Fizzy Cola".to_string());
        let fx = fixture(retriever);

        let outcome = analyze_subject(&fx.deps, "Fizzy Cola", None, Utc::now())
            .await
            .unwrap();
        assert!(matches!(outcome, AnalyzeOutcome::NoData));
        assert!(fx.trends.points.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn analyze_returns_summary_with_save_error_when_persistence_fails() {
        let mut retriever = FakeRetriever::default();
        retriever
            .batches
            .insert("Fizzy Cola".to_string(), positive_batch());
        let fx = fixture_with(
            retriever,
            MemoryTrendStore {
                fail_append: true,
                ..MemoryTrendStore::default()
            },
            MemorySummaryStore::default(),
        );

        let outcome = analyze_subject(&fx.deps, "Fizzy Cola", Some(Uuid::new_v4()), Utc::now())
            .await
            .unwrap();

        let AnalyzeOutcome::Completed {
            summary,
            save_error,
        } = outcome
        else {
            panic!("expected a summary despite the persistence failure");
        };
        assert_eq!(summary.positive_ratio, 100);
        assert!(save_error.unwrap().contains("append refused"));
        assert_eq!(*fx.summaries.saved.lock().unwrap(), 1, "summary save still ran");
    }

    #[tokio::test]
    async fn analyze_records_history_on_success() {
        let mut retriever = FakeRetriever::default();
        retriever
            .batches
            .insert("Fizzy Cola".to_string(), positive_batch());
        let fx = fixture(retriever);

        let outcome = analyze_subject(&fx.deps, "Fizzy Cola", None, Utc::now())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            AnalyzeOutcome::Completed { save_error: None, .. }
        ));
        assert_eq!(fx.trends.points.lock().unwrap().len(), 1);

        let trend = get_trend(&fx.deps, "Fizzy Cola", None).await.unwrap();
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].overall_score, 100);
    }
}
