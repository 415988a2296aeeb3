//! Error types for the grounded answering service.
//!
//! A single error enum covers every failure category. Abstaining from an
//! answer is a normal pipeline outcome and is never represented here.

use thiserror::Error;

/// Unified error type for the grounded answering service.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Startup-time configuration errors (missing store, unknown provider).
    /// The service refuses to start when one of these is raised.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or out-of-range request parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// Embedding or generation backend failed outright
    #[error("Backend unavailable: {0}")]
    Backend(String),

    /// Evidence store contents are inconsistent at query time
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt definition errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Short machine-readable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "configuration",
            AppError::Validation(_) => "validation",
            AppError::Backend(_) => "backend_unavailable",
            AppError::Knowledge(_) => "knowledge",
            AppError::Prompt(_) => "prompt",
            AppError::Io(_) => "io",
            AppError::Serialization(_) => "serialization",
            AppError::Other(_) => "other",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
