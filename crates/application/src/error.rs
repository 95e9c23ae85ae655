//! Application-level errors

use domain::ConfigurationError;
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// An injected failure is not an error; it is reported through
/// [`domain::Outcome::failure_injected`].
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Scenario configuration was rejected before any work happened
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// No stress job with this id is known
    #[error("Stress job not found: {0}")]
    JobNotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Whether the caller supplied a bad configuration
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
