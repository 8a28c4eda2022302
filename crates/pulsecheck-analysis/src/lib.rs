//! Sentiment analysis pipeline for pulsecheck.
//!
//! Collects subject mentions from news RSS, Reddit, Hacker News, and Mastodon,
//! collapses near-duplicates, classifies the surviving candidates through an
//! external text-understanding service (with a deterministic keyword fallback),
//! and aggregates per-run ratios, themes, and exemplar comments. Trend change
//! detection between runs lives in [`trend`].

pub mod aggregate;
pub mod classifier;
pub mod dedup;
pub mod error;
pub mod fallback;
pub mod trend;
pub mod types;

mod sources;

pub use aggregate::analyze_snippets;
pub use classifier::{ExternalClassifier, SnippetClassifier};
pub use error::AnalysisError;
pub use sources::collect_snippets;
pub use trend::{compute_change, trend_point_from_summary, ChangeDirection, ChangeEvent, TrendPoint};
pub use types::{
    AnalysisConfig, BucketExemplars, ClassifiedSnippet, Exemplar, OverallLabel, Platform,
    SentimentBucket, SentimentSummary, Snippet,
};
