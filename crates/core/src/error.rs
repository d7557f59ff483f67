//! Error types shared by the analyses
//!
//! Both kinds are local, synchronous failures handed back to the caller. The
//! analyses never retry, log or swallow them.

/// Errors raised by grid detection and turbine classification
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// Grid dimensions or thresholds that make the analysis meaningless
    #[error("Configuration error: {reason}")]
    Configuration {
        /// What was wrong with the configuration
        reason: String,
    },

    /// A sample is missing a field the analysis cannot work without
    #[error("Invalid sample field '{field}': {reason}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

impl AnalysisError {
    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a validation error for a missing field
    pub fn missing(field: &'static str) -> Self {
        Self::Validation {
            field,
            reason: "value is missing".to_owned(),
        }
    }

    /// Create a validation error for a NaN or infinite field
    pub fn not_finite(field: &'static str, value: f64) -> Self {
        Self::Validation {
            field,
            reason: format!("value {value} is not finite"),
        }
    }

    /// True for [`AnalysisError::Validation`]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Result alias for the analyses
pub type Result<T> = std::result::Result<T, AnalysisError>;
