//! External text-classification adapter with a local fallback strategy.
//!
//! The external capability receives the subject plus a numbered candidate
//! list and must return an overall label, three integer ratios, a narrative,
//! a theme list, and 1-based exemplar indices per bucket. Any failure
//! (unreachable service, timeout, malformed response) selects the local
//! keyword classifier instead, so classification always produces a summary.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::fallback::classify_locally;
use crate::types::{
    AnalysisConfig, BucketExemplars, Exemplar, OverallLabel, SentimentSummary, Snippet,
    MAX_EXEMPLARS_PER_BUCKET,
};

const CLASSIFY_PATH: &str = "/v1/classify";

#[derive(Debug, Serialize)]
struct ClassifyRequest {
    subject: String,
    /// Candidate texts, each prefixed with its 1-based index.
    items: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    overall: OverallLabel,
    positive_ratio: i32,
    negative_ratio: i32,
    neutral_ratio: i32,
    summary: String,
    themes: Vec<String>,
    positive_indices: Vec<i64>,
    negative_indices: Vec<i64>,
    neutral_indices: Vec<i64>,
}

/// Client for the external classification service.
///
/// Use [`ExternalClassifier::new`] with the configured base URL; tests point
/// it at a wiremock server instead.
pub struct ExternalClassifier {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExternalClassifier {
    /// Build a client with a bounded request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Classify the candidate set via the external capability.
    ///
    /// The returned summary carries the service's ratios as-is (they reflect
    /// its judgment over the whole candidate set, not a tally of exemplars),
    /// but a response whose ratios do not sum to exactly 100 is rejected as
    /// malformed. Exemplar indices are range-checked, de-duplicated, and
    /// truncated to [`MAX_EXEMPLARS_PER_BUCKET`] in response order.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] on network failure, timeout, or a
    /// non-2xx status, and [`AnalysisError::Classifier`] for a response that
    /// is missing required fields or violates the ratio contract.
    pub async fn classify(
        &self,
        subject: &str,
        candidates: &[Snippet],
    ) -> Result<SentimentSummary, AnalysisError> {
        let request = ClassifyRequest {
            subject: subject.to_string(),
            items: candidates
                .iter()
                .enumerate()
                .map(|(i, snippet)| format!("{}. {}", i + 1, snippet.text))
                .collect(),
        };

        let url = format!("{}{CLASSIFY_PATH}", self.base_url);
        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?.error_for_status()?;
        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Classifier(format!("malformed response: {e}")))?;

        build_summary(subject, candidates, body)
    }
}

/// Two-stage classification strategy: optional external primary plus the
/// always-available local fallback, selected by one decision function.
///
/// Construct with `None` to run fallback-only (unconfigured deployments and
/// tests exercise the fallback path directly, no failure mocking needed).
pub struct SnippetClassifier {
    external: Option<ExternalClassifier>,
}

impl SnippetClassifier {
    #[must_use]
    pub fn new(external: Option<ExternalClassifier>) -> Self {
        Self { external }
    }

    /// Build the strategy from config: external when a base URL is set,
    /// fallback-only otherwise (or when the client cannot be constructed).
    #[must_use]
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let external = config.classifier_base_url.as_ref().and_then(|base_url| {
            match ExternalClassifier::new(
                base_url,
                config.classifier_api_key.clone(),
                config.classifier_timeout_secs,
                &config.user_agent,
            ) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!(error = %e, "classifier client construction failed; using local fallback only");
                    None
                }
            }
        });
        Self { external }
    }

    /// Classify the candidates, never failing: any external error falls back
    /// to the local keyword classifier.
    pub async fn classify(&self, subject: &str, candidates: &[Snippet]) -> SentimentSummary {
        match &self.external {
            Some(external) => match external.classify(subject, candidates).await {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::warn!(
                        subject,
                        error = %e,
                        "external classification failed; using local fallback"
                    );
                    classify_locally(subject, candidates)
                }
            },
            None => classify_locally(subject, candidates),
        }
    }
}

fn build_summary(
    subject: &str,
    candidates: &[Snippet],
    body: ClassifyResponse,
) -> Result<SentimentSummary, AnalysisError> {
    let ratios = [body.positive_ratio, body.negative_ratio, body.neutral_ratio];
    if ratios.iter().any(|r| !(0..=100).contains(r)) {
        return Err(AnalysisError::Classifier(format!(
            "ratio out of range: {ratios:?}"
        )));
    }
    if ratios.iter().sum::<i32>() != 100 {
        return Err(AnalysisError::Classifier(format!(
            "ratios must sum to 100, got {ratios:?}"
        )));
    }

    let exemplars = BucketExemplars {
        positive: select_exemplars(candidates, &body.positive_indices),
        negative: select_exemplars(candidates, &body.negative_indices),
        neutral: select_exemplars(candidates, &body.neutral_indices),
    };

    Ok(SentimentSummary {
        subject: subject.to_string(),
        overall: body.overall,
        positive_ratio: body.positive_ratio,
        negative_ratio: body.negative_ratio,
        neutral_ratio: body.neutral_ratio,
        narrative: body.summary,
        key_themes: body.themes,
        exemplars,
        total_analyzed: candidates.len(),
        source_breakdown: BTreeMap::new(),
    })
}

/// Map untrusted 1-based indices onto candidates: out-of-range values are
/// silently dropped, duplicates keep only their first occurrence, and the
/// result is capped at [`MAX_EXEMPLARS_PER_BUCKET`] preserving response order.
fn select_exemplars(candidates: &[Snippet], indices: &[i64]) -> Vec<Exemplar> {
    let mut seen: HashSet<usize> = HashSet::new();
    indices
        .iter()
        .filter_map(|&raw| usize::try_from(raw).ok())
        .filter(|&i| i >= 1 && i <= candidates.len())
        .filter(|&i| seen.insert(i))
        .take(MAX_EXEMPLARS_PER_BUCKET)
        .map(|i| {
            let snippet = &candidates[i - 1];
            Exemplar {
                text: snippet.text.clone(),
                source_label: snippet.source_label.clone(),
                author: snippet.author.clone(),
            }
        })
        .collect()
}
