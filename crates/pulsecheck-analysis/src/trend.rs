//! Trend snapshots and change detection between runs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Platform, SentimentSummary};

/// One historical snapshot of a subject's sentiment.
///
/// Appended once per completed analysis and never mutated; `overall_score`
/// is the positive percentage, the single scalar compared between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub subject: String,
    pub positive_ratio: i32,
    pub negative_ratio: i32,
    pub neutral_ratio: i32,
    pub overall_score: i32,
    pub platform_counts: BTreeMap<Platform, usize>,
    pub total_count: usize,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    Up,
    Down,
}

/// A threshold-crossing sentiment swing, handed to the notification layer.
///
/// Ephemeral: computed, delivered, and dropped; the persisted artifact is
/// the notification record, not the event itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub subject: String,
    pub previous_score: i32,
    pub current_score: i32,
    pub direction: ChangeDirection,
    pub magnitude: i32,
}

/// Derive the trend point recorded after an analysis run.
#[must_use]
pub fn trend_point_from_summary(
    summary: &SentimentSummary,
    recorded_at: DateTime<Utc>,
) -> TrendPoint {
    TrendPoint {
        subject: summary.subject.clone(),
        positive_ratio: summary.positive_ratio,
        negative_ratio: summary.negative_ratio,
        neutral_ratio: summary.neutral_ratio,
        overall_score: summary.positive_ratio,
        platform_counts: summary.source_breakdown.clone(),
        total_count: summary.total_analyzed,
        recorded_at,
    }
}

/// Compare the current score against the previous one.
///
/// Returns `None` when there is no baseline (first-ever run) or the swing is
/// below the threshold. A magnitude exactly equal to the threshold counts as
/// significant.
#[must_use]
pub fn compute_change(
    subject: &str,
    previous_score: Option<i32>,
    current_score: i32,
    threshold: i32,
) -> Option<ChangeEvent> {
    let previous = previous_score?;
    let magnitude = (current_score - previous).abs();
    if magnitude < threshold {
        return None;
    }
    Some(ChangeEvent {
        subject: subject.to_string(),
        previous_score: previous,
        current_score,
        direction: if current_score > previous {
            ChangeDirection::Up
        } else {
            ChangeDirection::Down
        },
        magnitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OverallLabel;

    #[test]
    fn no_baseline_never_produces_an_event() {
        for current in [0, 37, 100] {
            for threshold in [5, 50, 100] {
                assert!(compute_change("widget", None, current, threshold).is_none());
            }
        }
    }

    #[test]
    fn magnitude_equal_to_threshold_counts() {
        let event = compute_change("widget", Some(50), 70, 20).expect("boundary equality counts");
        assert_eq!(event.magnitude, 20);
        assert_eq!(event.direction, ChangeDirection::Up);
        assert_eq!(event.previous_score, 50);
        assert_eq!(event.current_score, 70);
    }

    #[test]
    fn magnitude_below_threshold_is_silent() {
        assert!(compute_change("widget", Some(70), 50, 21).is_none());
    }

    #[test]
    fn downward_swing_reports_down() {
        let event = compute_change("widget", Some(70), 50, 20).unwrap();
        assert_eq!(event.direction, ChangeDirection::Down);
        assert_eq!(event.magnitude, 20);
    }

    #[test]
    fn overall_score_is_the_positive_ratio() {
        let summary = SentimentSummary {
            subject: "widget".to_string(),
            overall: OverallLabel::Mixed,
            positive_ratio: 42,
            negative_ratio: 41,
            neutral_ratio: 17,
            narrative: String::new(),
            key_themes: Vec::new(),
            exemplars: crate::types::BucketExemplars::default(),
            total_analyzed: 12,
            source_breakdown: BTreeMap::new(),
        };
        let point = trend_point_from_summary(&summary, Utc::now());
        assert_eq!(point.overall_score, 42);
        assert_eq!(point.total_count, 12);
    }
}
