use thiserror::Error;

mod app_config;
mod cadence;
mod config;
mod validate;

pub use app_config::{AppConfig, Environment};
pub use cadence::Cadence;
pub use config::{load_app_config, load_app_config_from_env};
pub use validate::{
    validate_subject, validate_threshold, ValidationError, MAX_SUBJECT_LEN, MAX_THRESHOLD_PERCENT,
    MIN_THRESHOLD_PERCENT,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
