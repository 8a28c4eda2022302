//! Monitor scheduler logic for pulsecheck.
//!
//! Decides per subscription whether a run is due, executes the
//! retrieve → dedup → classify → record → compare pipeline, and dispatches
//! notifications when a sentiment swing crosses the subscription's threshold.
//! Collaborators (retrieval, stores, notifier) are injected behind traits so
//! the runner is testable without a database or network.

mod error;
mod notify;
mod pg;
mod ports;
mod runner;
mod schedule;

pub use error::MonitorError;
pub use notify::{change_notification, ChannelNotifier, EmailSettings, NotificationRequest};
pub use pg::{pg_deps, PgSubscriptionStore, PgSummaryStore, PgTrendStore, WebRetriever};
pub use ports::{Notifier, SnippetRetriever, SubscriptionStore, SummaryStore, TrendStore};
pub use runner::{
    analyze_subject, get_trend, run_all, run_monitoring_sweep, run_one, AnalyzeOutcome,
    MonitorDeps, RunOutcome, SweepOutcome, SweepReport, DEFAULT_TREND_LIMIT,
};
pub use schedule::is_due;
