//! Error types for CAP

use thiserror::Error;

/// Errors that can occur at the boundaries of the scoring pipeline.
///
/// The score and nudge engines themselves are infallible; everything here is
/// raised before any output is produced.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Failed to parse policy: {0}")]
    PolicyParse(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
