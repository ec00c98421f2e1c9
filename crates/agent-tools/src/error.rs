//! Error types for tool operations.

use thiserror::Error;

/// Errors that can occur during tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool not found in registry.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Invalid parameter value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A provider key or URL that the operation needs is not configured.
    #[error("{0} not configured")]
    ConfigurationMissing(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Upstream answered, but not with anything usable.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Every provider in a fallback chain failed.
    #[error("All {0} providers failed")]
    Exhausted(String),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ToolError {
    /// Whether this error was caused by the caller's input rather than an upstream.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ToolError::NotFound(_) | ToolError::InvalidParameter { .. }
        )
    }

    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ToolError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
