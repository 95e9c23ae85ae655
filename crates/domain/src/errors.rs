//! Domain-level errors

use thiserror::Error;

/// Invalid or out-of-bounds scenario configuration
///
/// Always raised before any simulated work or state mutation happens,
/// and never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Scenario kind is not one of the supported kinds
    #[error("Unknown scenario kind: {0}")]
    UnknownKind(String),

    /// A required parameter was not supplied
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// A parameter the scenario kind does not understand
    #[error("Unknown parameter '{name}' for {kind} scenarios")]
    UnknownParameter { name: String, kind: String },

    /// A parameter has the wrong type
    #[error("Parameter '{name}' must be {expected}")]
    InvalidType {
        name: String,
        expected: &'static str,
    },

    /// A numeric parameter is outside its documented bounds
    #[error("Parameter '{name}' = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Any other invalid combination of parameters
    #[error("Invalid parameter '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

impl ConfigurationError {
    /// Create an out-of-range error
    pub fn out_of_range(name: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            name: name.into(),
            value,
            min,
            max,
        }
    }

    /// Create an invalid-parameter error
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending parameter, if any
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::UnknownKind(_) => None,
            Self::MissingParameter(name)
            | Self::UnknownParameter { name, .. }
            | Self::InvalidType { name, .. }
            | Self::OutOfRange { name, .. }
            | Self::Invalid { name, .. } => Some(name),
        }
    }
}
