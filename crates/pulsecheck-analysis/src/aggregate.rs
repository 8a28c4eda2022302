//! Aggregation: raw batch → breakdown, dedup, classification, stamping.

use std::collections::BTreeMap;

use crate::classifier::SnippetClassifier;
use crate::dedup::dedupe;
use crate::types::{Platform, SentimentSummary, Snippet};

/// Run one full aggregation for a subject over a raw multi-source batch.
///
/// The platform breakdown is counted over the raw batch (per-platform
/// retrieval yield, duplicates included), while the ratios and exemplars are
/// computed over the deduplicated candidate set; the two are intentionally
/// not consistent with each other.
///
/// Returns `None` when no candidates survive dedup: the benign "no data"
/// signal, distinct from any error. No summary is fabricated for an empty
/// set.
pub async fn analyze_snippets(
    classifier: &SnippetClassifier,
    subject: &str,
    raw: Vec<Snippet>,
) -> Option<SentimentSummary> {
    let breakdown = platform_breakdown(&raw);
    let candidates = dedupe(raw);

    if candidates.is_empty() {
        tracing::info!(subject, "no candidates after dedup; nothing to analyze");
        return None;
    }

    let mut summary = classifier.classify(subject, &candidates).await;
    summary.total_analyzed = candidates.len();
    summary.source_breakdown = breakdown;
    Some(summary)
}

/// Count snippets per platform over a raw (pre-dedup) batch.
#[must_use]
pub fn platform_breakdown(snippets: &[Snippet]) -> BTreeMap<Platform, usize> {
    let mut counts = BTreeMap::new();
    for snippet in snippets {
        *counts.entry(snippet.platform).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(text: &str, platform: Platform) -> Snippet {
        Snippet {
            text: text.to_string(),
            source_label: "test".to_string(),
            author: None,
            url: None,
            platform,
        }
    }

    #[tokio::test]
    async fn empty_batch_yields_no_summary() {
        let classifier = SnippetClassifier::new(None);
        assert!(analyze_snippets(&classifier, "Widget", Vec::new())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn batch_of_only_short_texts_yields_no_summary() {
        let classifier = SnippetClassifier::new(None);
        let raw = vec![
            snippet("meh", Platform::Reddit),
            snippet("ok product", Platform::News),
        ];
        assert!(analyze_snippets(&classifier, "Widget", raw).await.is_none());
    }

    #[tokio::test]
    async fn breakdown_counts_raw_yield_while_totals_count_survivors() {
        let classifier = SnippetClassifier::new(None);
        let duplicate = "this exact review text appears on two platforms";
        let raw = vec![
            snippet(duplicate, Platform::News),
            snippet(duplicate, Platform::Reddit),
            snippet("an entirely different remark about the product", Platform::Reddit),
        ];

        let summary = analyze_snippets(&classifier, "Widget", raw)
            .await
            .expect("non-empty candidates should produce a summary");

        // Raw yield: 1 news + 2 reddit. Survivors after dedup: 2.
        assert_eq!(summary.source_breakdown[&Platform::News], 1);
        assert_eq!(summary.source_breakdown[&Platform::Reddit], 2);
        assert_eq!(summary.total_analyzed, 2);
    }

    #[tokio::test]
    async fn summary_ratios_always_sum_to_one_hundred() {
        let classifier = SnippetClassifier::new(None);
        let raw = vec![
            snippet("great product, love the build quality here", Platform::News),
            snippet("terrible experience, would ask for a refund", Platform::Reddit),
            snippet("it exists and it turns on when plugged in", Platform::Mastodon),
        ];
        let summary = analyze_snippets(&classifier, "Widget", raw).await.unwrap();
        assert_eq!(
            summary.positive_ratio + summary.negative_ratio + summary.neutral_ratio,
            100
        );
    }
}
