//! Prompt assembly error types.

use kgquest_core::KgError;
use thiserror::Error;

/// Errors that can occur while assembling prompts or writing results.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Background composition or data loading failed.
    #[error(transparent)]
    Kg(#[from] KgError),

    /// A quest field has the wrong shape for its kind.
    #[error("Malformed quest field '{field}': {reason}")]
    MalformedQuest {
        /// Field name as it appears in the record.
        field: String,
        /// What was expected.
        reason: String,
    },

    /// Results could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Results could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, PromptError>;
