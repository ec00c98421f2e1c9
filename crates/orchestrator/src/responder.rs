//! Chat responder: tool, then model, then canned fallback.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agent_tools::{ToolArgs, ToolRegistry};
use brain_core::{Brain, InboundMessage};
use llm_brain::{brain_from_config, LlmConfig, EMPTY_REPLY};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::intent::{IntentRouter, ToolIntent};

/// Sender label attached to model requests.
const CHAT_SENDER: &str = "web";

/// Default bound on a single model call.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// Replies used when no tool matched and no model answered.
pub const FALLBACK_REPLIES: [&str; 3] = [
    "I'm here to help! I can provide real-time information like current time, weather, search results, and more.",
    "Feel free to ask me about the current time, weather in any city, or search for information on any topic.",
    "I'm your AI assistant with access to real-time tools. What would you like to know?",
];

/// Which tier produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Tool,
    Model,
    Fallback,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Tool => "tool",
            ReplySource::Model => "model",
            ReplySource::Fallback => "fallback",
        }
    }
}

/// A reply to a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub content: String,
    pub source: ReplySource,
    pub tools_used: Vec<String>,
}

impl ChatReply {
    fn new(content: impl Into<String>, source: ReplySource) -> Self {
        Self {
            content: content.into(),
            source,
            tools_used: Vec::new(),
        }
    }
}

/// Answers chat messages.
///
/// A message that classifies to a tool is answered by that tool. Anything else
/// goes to the configured [`Brain`], if there is one, and finally to one of
/// [`FALLBACK_REPLIES`]. [`ChatResponder::respond`] never fails.
pub struct ChatResponder {
    registry: ToolRegistry,
    router: IntentRouter,
    brain: Option<Arc<dyn Brain>>,
    model_timeout: Duration,
    next_fallback: AtomicUsize,
}

impl ChatResponder {
    /// Responder with the built-in intent rules and no model.
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            router: IntentRouter::new(),
            brain: None,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
            next_fallback: AtomicUsize::new(0),
        }
    }

    /// Build a responder, attaching a model from the `LLM_*` environment if one
    /// is configured.
    pub fn from_env(registry: ToolRegistry) -> Self {
        let responder = Self::new(registry);

        let config = match LlmConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                info!("No language model configured, using fallback replies: {}", e);
                return responder;
            }
        };

        let timeout = config.timeout;
        match brain_from_config(config) {
            Ok(brain) => {
                info!("Chat model: {}", brain.name());
                responder.with_brain(brain).with_model_timeout(timeout)
            }
            Err(e) => {
                warn!("Failed to initialize language model: {}", e);
                responder
            }
        }
    }

    /// Use `brain` for messages no tool handles.
    pub fn with_brain(mut self, brain: Arc<dyn Brain>) -> Self {
        self.brain = Some(brain);
        self
    }

    /// Replace the intent rules.
    pub fn with_router(mut self, router: IntentRouter) -> Self {
        self.router = router;
        self
    }

    /// Bound each model call.
    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn router(&self) -> &IntentRouter {
        &self.router
    }

    /// Whether a model tier is attached.
    pub fn has_model(&self) -> bool {
        self.brain.is_some()
    }

    /// Answer a message.
    pub async fn respond(&self, message: &str) -> ChatReply {
        if let Some(intent) = self.router.classify(message) {
            info!("Routing message to tool: {}", intent.tool);
            return self.run_tool(intent).await;
        }

        if let Some(content) = self.ask_model(message).await {
            return ChatReply::new(content, ReplySource::Model);
        }

        ChatReply::new(self.fallback_reply(), ReplySource::Fallback)
    }

    async fn run_tool(&self, intent: ToolIntent) -> ChatReply {
        let name = intent.tool.as_str();
        let params = ToolArgs::from_strings(&intent.parameters).params;

        let content = match self.registry.execute(name, params).await {
            Ok(output) => output.content,
            Err(e) => {
                warn!("Tool '{}' failed: {}", name, e);
                format!("Error executing {}: {}", name, e)
            }
        };

        ChatReply {
            content,
            source: ReplySource::Tool,
            tools_used: vec![name.to_string()],
        }
    }

    async fn ask_model(&self, message: &str) -> Option<String> {
        let brain = self.brain.as_ref()?;
        let inbound = InboundMessage::direct(
            CHAT_SENDER,
            message,
            chrono::Utc::now().timestamp_millis(),
        );

        match tokio::time::timeout(self.model_timeout, brain.process(inbound)).await {
            Ok(Ok(reply)) => {
                debug!("{} replied with {} chars", brain.name(), reply.text.len());
                if reply.text.trim().is_empty() {
                    Some(EMPTY_REPLY.to_string())
                } else {
                    Some(reply.text)
                }
            }
            Ok(Err(e)) => {
                warn!("{} unavailable: {}", brain.name(), e);
                None
            }
            Err(_) => {
                warn!(
                    "{} timed out after {}s",
                    brain.name(),
                    self.model_timeout.as_secs_f64()
                );
                None
            }
        }
    }

    fn fallback_reply(&self) -> &'static str {
        let index = self.next_fallback.fetch_add(1, Ordering::Relaxed);
        FALLBACK_REPLIES[index % FALLBACK_REPLIES.len()]
    }
}
