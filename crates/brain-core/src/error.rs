//! Error types for brain operations.

use thiserror::Error;

/// Errors that can occur during brain processing.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The brain is not configured (missing key, unknown provider).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The upstream model server could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The brain is temporarily unavailable.
    #[error("brain unavailable: {0}")]
    Unavailable(String),

    /// The message could not be processed.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// A timeout occurred during processing.
    #[error("processing timed out")]
    Timeout,
}
