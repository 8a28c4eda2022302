use thiserror::Error;

/// Longest subject name accepted for analysis or monitoring.
pub const MAX_SUBJECT_LEN: usize = 120;
/// Inclusive bounds for a subscription's change threshold, in percent.
pub const MIN_THRESHOLD_PERCENT: i32 = 5;
pub const MAX_THRESHOLD_PERCENT: i32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("subject must not be empty")]
    EmptySubject,
    #[error("subject exceeds {MAX_SUBJECT_LEN} characters")]
    SubjectTooLong,
    #[error(
        "change threshold must be between {MIN_THRESHOLD_PERCENT} and {MAX_THRESHOLD_PERCENT} percent, got {0}"
    )]
    ThresholdOutOfRange(i32),
    #[error("unknown cadence: {0}")]
    UnknownCadence(String),
}

/// Check a subject name before any pipeline work is attempted.
///
/// # Errors
///
/// Returns [`ValidationError::EmptySubject`] for empty or whitespace-only
/// input, or [`ValidationError::SubjectTooLong`] past [`MAX_SUBJECT_LEN`].
pub fn validate_subject(subject: &str) -> Result<(), ValidationError> {
    if subject.trim().is_empty() {
        return Err(ValidationError::EmptySubject);
    }
    if subject.chars().count() > MAX_SUBJECT_LEN {
        return Err(ValidationError::SubjectTooLong);
    }
    Ok(())
}

/// Check a subscription change threshold against the allowed range.
///
/// # Errors
///
/// Returns [`ValidationError::ThresholdOutOfRange`] outside `[5, 100]`.
pub fn validate_threshold(threshold_percent: i32) -> Result<(), ValidationError> {
    if (MIN_THRESHOLD_PERCENT..=MAX_THRESHOLD_PERCENT).contains(&threshold_percent) {
        Ok(())
    } else {
        Err(ValidationError::ThresholdOutOfRange(threshold_percent))
    }
}
