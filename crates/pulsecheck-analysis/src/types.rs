use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Most exemplar comments kept per sentiment bucket.
pub const MAX_EXEMPLARS_PER_BUCKET: usize = 5;

/// Categorical provenance bucket for a snippet, used for breakdown counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Reddit,
    News,
    HackerNews,
    Mastodon,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::News => "news",
            Platform::HackerNews => "hacker_news",
            Platform::Mastodon => "mastodon",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed text unit about a subject, as returned by a retrieval source.
///
/// Created fresh each run and discarded after aggregation; snippets are never
/// persisted individually.
#[derive(Debug, Clone)]
pub struct Snippet {
    pub text: String,
    /// Free-form provenance, e.g. a subreddit or feed hostname.
    pub source_label: String,
    pub author: Option<String>,
    pub url: Option<String>,
    pub platform: Platform,
}

/// Sentiment class assigned to a single snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentBucket {
    Positive,
    Negative,
    Neutral,
}

/// A snippet plus its sentiment bucket.
#[derive(Debug, Clone)]
pub struct ClassifiedSnippet {
    pub snippet: Snippet,
    pub bucket: SentimentBucket,
}

/// Overall sentiment label for a whole analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl OverallLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OverallLabel::Positive => "positive",
            OverallLabel::Negative => "negative",
            OverallLabel::Neutral => "neutral",
            OverallLabel::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for OverallLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An illustrative comment kept alongside the aggregate ratios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exemplar {
    pub text: String,
    pub source_label: String,
    pub author: Option<String>,
}

/// Up to [`MAX_EXEMPLARS_PER_BUCKET`] exemplars per sentiment bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketExemplars {
    pub positive: Vec<Exemplar>,
    pub negative: Vec<Exemplar>,
    pub neutral: Vec<Exemplar>,
}

/// One aggregation result for one subject at one point in time.
///
/// `positive_ratio + negative_ratio + neutral_ratio == 100` always holds.
/// `source_breakdown` counts raw per-platform retrieval yield (before dedup),
/// while ratios and exemplars reflect the deduplicated candidate set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub subject: String,
    pub overall: OverallLabel,
    pub positive_ratio: i32,
    pub negative_ratio: i32,
    pub neutral_ratio: i32,
    pub narrative: String,
    pub key_themes: Vec<String>,
    pub exemplars: BucketExemplars,
    pub total_analyzed: usize,
    pub source_breakdown: BTreeMap<Platform, usize>,
}

/// Configuration for retrieval sources and the external classifier.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub classifier_base_url: Option<String>,
    pub classifier_api_key: Option<String>,
    pub classifier_timeout_secs: u64,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub mastodon_instance: String,
}

impl AnalysisConfig {
    #[must_use]
    pub fn from_app_config(config: &pulsecheck_core::AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            request_timeout_secs: config.retrieval_timeout_secs,
            classifier_base_url: config.classifier_base_url.clone(),
            classifier_api_key: config.classifier_api_key.clone(),
            classifier_timeout_secs: config.classifier_timeout_secs,
            reddit_client_id: config.reddit_client_id.clone(),
            reddit_client_secret: config.reddit_client_secret.clone(),
            mastodon_instance: config.mastodon_instance.clone(),
        }
    }
}
