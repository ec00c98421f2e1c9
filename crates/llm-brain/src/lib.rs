//! Language-model brains for the assistant's generative reply tier.
//!
//! Two backends implement [`brain_core::Brain`]:
//!
//! - [`OpenAiBrain`] - any OpenAI-compatible `/v1/chat/completions` server
//! - [`OllamaBrain`] - a local Ollama daemon via `/api/chat`
//!
//! Both make one stateless call per message with a bounded token budget and
//! an HTTP timeout, so a slow model cannot hold a request forever.
//!
//! # Usage
//!
//! ```rust,no_run
//! use llm_brain::{brain_from_config, LlmConfig};
//!
//! let config = LlmConfig::from_env().expect("no model configured");
//! let brain = brain_from_config(config).expect("failed to build brain");
//! println!("using {}", brain.name());
//! ```

mod api_types;
mod config;
mod ollama;
mod openai;

use std::sync::Arc;

pub use config::{LlmConfig, LlmConfigBuilder, LlmProvider, DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_URL};
pub use ollama::OllamaBrain;
pub use openai::OpenAiBrain;

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, InboundMessage, OutboundMessage};

/// Reply text used when the model answers with no content.
pub const EMPTY_REPLY: &str = "I received an empty response.";

/// Build the brain selected by `config.provider`.
pub fn brain_from_config(config: LlmConfig) -> Result<Arc<dyn Brain>, BrainError> {
    match config.provider {
        LlmProvider::OpenAi => Ok(Arc::new(OpenAiBrain::new(config)?)),
        LlmProvider::Ollama => Ok(Arc::new(OllamaBrain::new(config)?)),
    }
}
