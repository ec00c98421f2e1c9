//! Chat orchestration for the assistant.
//!
//! The orchestrator decides how a free-text message gets answered:
//!
//! ```text
//! message ──► IntentRouter ──► Some(ToolIntent) ──► ToolRegistry ──► source = "tool"
//!                  │
//!                  └─ None ──► Brain (OpenAI / Ollama) ──► source = "model"
//!                                  │
//!                                  └─ unconfigured / error / timeout ──► source = "fallback"
//! ```
//!
//! - [`IntentRouter`] - ordered keyword rules with per-tool parameter extraction
//! - [`ChatResponder`] - runs the three tiers and never fails
//!
//! # Example
//!
//! ```rust,no_run
//! use agent_tools::{Toolkit, ToolsConfig};
//! use orchestrator::ChatResponder;
//!
//! #[tokio::main]
//! async fn main() {
//!     let toolkit = Toolkit::from_config(&ToolsConfig::from_env()).unwrap();
//!     let responder = ChatResponder::from_env(toolkit.registry());
//!
//!     let reply = responder.respond("weather in Paris").await;
//!     println!("[{}] {}", reply.source.as_str(), reply.content);
//! }
//! ```

mod intent;
mod responder;

pub use intent::{
    Extractor, IntentRouter, IntentRule, ToolIntent, ToolName, DEFAULT_WEATHER_LOCATION,
};
pub use responder::{
    ChatReply, ChatResponder, ReplySource, DEFAULT_MODEL_TIMEOUT, FALLBACK_REPLIES,
};
