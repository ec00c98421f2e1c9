//! OllamaBrain implementation for a local Ollama daemon.

use brain_core::{async_trait, Brain, BrainError, InboundMessage, OutboundMessage};
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{single_turn, OllamaChatRequest, OllamaChatResponse, OllamaOptions};
use crate::config::LlmConfig;
use crate::EMPTY_REPLY;

/// A brain backed by Ollama's non-streaming `/api/chat` endpoint.
pub struct OllamaBrain {
    client: Client,
    config: LlmConfig,
}

impl OllamaBrain {
    /// Create a new OllamaBrain with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, BrainError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BrainError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        info!("OllamaBrain initialized at {} with model: {}", config.api_url, config.model);

        Ok(Self { client, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.api_url.trim_end_matches('/')
    }
}

#[async_trait]
impl Brain for OllamaBrain {
    async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
        let url = format!("{}/api/chat", self.base_url());
        let request = OllamaChatRequest {
            model: self.config.model.clone(),
            messages: single_turn(self.config.system_prompt.as_deref(), &message.text),
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        debug!("Sending chat request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BrainError::Timeout
                } else {
                    BrainError::Network(format!("Ollama unreachable: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(BrainError::ProcessingFailed(format!(
                "Ollama API error: {}",
                response.status()
            )));
        }

        let body: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))?;

        let text = body
            .message
            .map(|m| m.content)
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string());

        Ok(OutboundMessage::reply_to(&message, text))
    }

    fn name(&self) -> &str {
        "OllamaBrain"
    }

    /// Ollama is ready when its model list endpoint answers.
    async fn is_ready(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url());
        matches!(self.client.get(&url).send().await, Ok(r) if r.status().is_success())
    }
}
