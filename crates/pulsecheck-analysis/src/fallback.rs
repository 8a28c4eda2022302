//! Deterministic keyword classifier used when the external capability fails.

use std::collections::BTreeMap;

use crate::types::{
    BucketExemplars, ClassifiedSnippet, Exemplar, OverallLabel, SentimentBucket, SentimentSummary,
    Snippet, MAX_EXEMPLARS_PER_BUCKET,
};

/// Words whose presence signals a positive comment.
const POSITIVE_KEYWORDS: &[&str] = &[
    "great",
    "good",
    "excellent",
    "amazing",
    "awesome",
    "fantastic",
    "love",
    "loved",
    "best",
    "recommend",
    "quality",
    "delicious",
    "refreshing",
    "perfect",
    "happy",
    "impressed",
    "solid",
    "fine",
    "reliable",
    "win",
];

/// Words whose presence signals a negative comment.
const NEGATIVE_KEYWORDS: &[&str] = &[
    "bad",
    "terrible",
    "worst",
    "awful",
    "horrible",
    "broken",
    "defective",
    "disappointing",
    "disappointed",
    "refund",
    "recall",
    "dangerous",
    "harmful",
    "lawsuit",
    "scam",
    "failed",
    "failure",
    "problem",
    "concern",
    "warning",
    "avoid",
    "useless",
    "waste",
];

/// Assign a sentiment bucket to one text.
///
/// Positive keyword and no negative keyword means positive; negative keyword
/// and no positive keyword means negative; everything else (neither, or both)
/// is neutral. Matching is word-wise with surrounding punctuation stripped, so
/// `"Great!!"` matches `"great"` but `"badge"` does not match `"bad"`.
#[must_use]
pub fn classify_bucket(text: &str) -> SentimentBucket {
    let mut has_positive = false;
    let mut has_negative = false;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if POSITIVE_KEYWORDS.contains(&w.as_str()) {
            has_positive = true;
        }
        if NEGATIVE_KEYWORDS.contains(&w.as_str()) {
            has_negative = true;
        }
    }
    match (has_positive, has_negative) {
        (true, false) => SentimentBucket::Positive,
        (false, true) => SentimentBucket::Negative,
        _ => SentimentBucket::Neutral,
    }
}

/// Classify a candidate set locally. Pure and deterministic: the same input
/// sequence always produces an identical summary.
#[must_use]
pub fn classify_locally(subject: &str, candidates: &[Snippet]) -> SentimentSummary {
    let classified: Vec<ClassifiedSnippet> = candidates
        .iter()
        .map(|snippet| ClassifiedSnippet {
            snippet: snippet.clone(),
            bucket: classify_bucket(&snippet.text),
        })
        .collect();

    let positive_count = count_bucket(&classified, SentimentBucket::Positive);
    let negative_count = count_bucket(&classified, SentimentBucket::Negative);

    let (positive_ratio, negative_ratio, neutral_ratio) =
        ratio_percentages(positive_count, negative_count, candidates.len());
    let overall = overall_label(positive_ratio, negative_ratio);

    SentimentSummary {
        subject: subject.to_string(),
        overall,
        positive_ratio,
        negative_ratio,
        neutral_ratio,
        narrative: narrative(subject, candidates.len(), positive_ratio, negative_ratio, overall),
        key_themes: key_themes(overall),
        exemplars: select_exemplars(&classified),
        total_analyzed: candidates.len(),
        source_breakdown: BTreeMap::new(),
    }
}

fn count_bucket(classified: &[ClassifiedSnippet], bucket: SentimentBucket) -> usize {
    classified.iter().filter(|c| c.bucket == bucket).count()
}

/// Integer percentages summing to exactly 100.
///
/// Positive and negative are rounded independently; the neutral bucket takes
/// `100 - positive - negative` and therefore absorbs all rounding error. An
/// empty candidate set yields 0/0/100.
pub(crate) fn ratio_percentages(
    positive_count: usize,
    negative_count: usize,
    candidate_count: usize,
) -> (i32, i32, i32) {
    let total = candidate_count.max(1);
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let pct = |count: usize| -> i32 { (100.0 * count as f64 / total as f64).round() as i32 };
    let positive = pct(positive_count);
    let negative = pct(negative_count);
    (positive, negative, 100 - positive - negative)
}

/// Overall label cutoffs, evaluated in order with strict comparisons.
fn overall_label(positive_ratio: i32, negative_ratio: i32) -> OverallLabel {
    if positive_ratio > 60 {
        OverallLabel::Positive
    } else if negative_ratio > 60 {
        OverallLabel::Negative
    } else if positive_ratio > 40 || negative_ratio > 40 {
        OverallLabel::Mixed
    } else {
        OverallLabel::Neutral
    }
}

/// First `MAX_EXEMPLARS_PER_BUCKET` candidates per bucket, in input order.
fn select_exemplars(classified: &[ClassifiedSnippet]) -> BucketExemplars {
    let mut exemplars = BucketExemplars::default();
    for item in classified {
        let bucket = match item.bucket {
            SentimentBucket::Positive => &mut exemplars.positive,
            SentimentBucket::Negative => &mut exemplars.negative,
            SentimentBucket::Neutral => &mut exemplars.neutral,
        };
        if bucket.len() < MAX_EXEMPLARS_PER_BUCKET {
            bucket.push(Exemplar {
                text: item.snippet.text.clone(),
                source_label: item.snippet.source_label.clone(),
                author: item.snippet.author.clone(),
            });
        }
    }
    exemplars
}

/// Template narrative from the computed numbers, not from content.
fn narrative(
    subject: &str,
    candidate_count: usize,
    positive_ratio: i32,
    negative_ratio: i32,
    overall: OverallLabel,
) -> String {
    format!(
        "Keyword scan of {candidate_count} recent mentions of {subject}: \
         {positive_ratio}% read positive and {negative_ratio}% negative, \
         an overall {overall} picture."
    )
}

/// Fixed theme labels keyed off the overall label.
fn key_themes(overall: OverallLabel) -> Vec<String> {
    let themes: &[&str] = match overall {
        OverallLabel::Positive => &["favorable reception", "product praise"],
        OverallLabel::Negative => &["customer complaints", "product criticism"],
        OverallLabel::Mixed => &["divided opinions", "polarized feedback"],
        OverallLabel::Neutral => &["general discussion"],
    };
    themes.iter().map(ToString::to_string).collect()
}
