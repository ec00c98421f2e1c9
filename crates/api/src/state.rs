//! Application state shared across handlers.

use std::fmt::Display;
use std::sync::Arc;

use agent_tools::{ToolError, ToolRegistry, Toolkit};
use orchestrator::ChatResponder;

use crate::config::Config;
use crate::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Time, weather, search and IP components.
    pub toolkit: Toolkit,
    /// The same components, dispatchable by name.
    pub registry: ToolRegistry,
    /// Chat tiers.
    pub responder: Arc<ChatResponder>,
    /// Attach error details to 500 responses.
    pub expose_errors: bool,
}

impl AppState {
    /// Create new application state. The registry is taken from the responder.
    pub fn new(toolkit: Toolkit, responder: ChatResponder, expose_errors: bool) -> Self {
        Self {
            toolkit,
            registry: responder.registry().clone(),
            responder: Arc::new(responder),
            expose_errors,
        }
    }

    /// Build every component from configuration, with the chat model taken
    /// from the `LLM_*` environment.
    pub fn from_config(config: &Config) -> Result<Self, ToolError> {
        let toolkit = Toolkit::from_config(&config.tools)?;
        let responder = ChatResponder::from_env(toolkit.registry());
        Ok(Self::new(toolkit, responder, config.expose_errors))
    }

    /// A 500 with a generic `message`; `err` is attached only when exposure is on.
    pub fn internal(&self, message: &str, err: impl Display) -> ApiError {
        tracing::error!("{}: {}", message, err);
        ApiError::Internal {
            message: message.to_string(),
            details: self.expose_errors.then(|| err.to_string()),
        }
    }

    /// Map a tool failure: bad input is a 400, everything else a 500.
    pub fn tool_error(&self, err: ToolError) -> ApiError {
        if err.is_invalid_input() {
            ApiError::BadRequest(err.to_string())
        } else {
            self.internal("Tool execution failed", err)
        }
    }
}
