use thiserror::Error;

/// Failure taxonomy for monitor runs.
///
/// Classification failures never appear here: the classifier strategy always
/// degrades to its local fallback internally.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Validation(#[from] pulsecheck_core::ValidationError),

    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("notification failed: {0}")]
    Notification(String),
}
