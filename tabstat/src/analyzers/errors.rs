//! Error types for analyzer execution.

use thiserror::Error;

/// Errors surfaced by individual analyzers.
///
/// These never abort a run: the orchestrator converts them into an
/// unavailable report section plus a diagnostic note.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    /// A statistic could not be computed from the data given.
    #[error("computation error: {message}")]
    Computation { message: String },

    /// The analyzer received data it cannot operate on.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    /// Failure while executing the analysis itself.
    #[error("execution error: {message}")]
    Execution { message: String },

    /// Catch-all for anything the other variants do not cover.
    #[error("{message}")]
    Custom { message: String },
}

impl AnalyzerError {
    /// Creates a computation error.
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation {
            message: message.into(),
        }
    }

    /// Creates an invalid-data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Creates an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Creates a custom error.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the analyzers.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
