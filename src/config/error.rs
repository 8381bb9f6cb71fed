//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("{field} must be within [{min}, {max}], got {actual}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Allocation ratios are invalid: {0}")]
    InvalidAllocation(String),

    #[error("Invalid validation timeout")]
    InvalidTimeout,

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

impl ValidationError {
    pub(crate) fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), Self> {
        if value.is_finite() && (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field,
                min,
                max,
                actual: value,
            })
        }
    }
}
