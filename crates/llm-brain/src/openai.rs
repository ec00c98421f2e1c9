//! OpenAiBrain implementation using the chat completions API.

use brain_core::{
    async_trait, hash_prompt, Brain, BrainError, InboundMessage, OutboundMessage,
};
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{single_turn, ApiError, ChatCompletionRequest, ChatCompletionResponse};
use crate::config::LlmConfig;
use crate::EMPTY_REPLY;

/// A brain backed by an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// Each call is a single stateless turn: optional system prompt plus the
/// user's message, capped at the configured token budget.
pub struct OpenAiBrain {
    client: Client,
    config: LlmConfig,
}

impl OpenAiBrain {
    /// Create a new OpenAiBrain with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, BrainError> {
        if config.api_key.is_none() {
            return Err(BrainError::Configuration(
                "OpenAI brain requires an API key".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BrainError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        if let Some(ref prompt) = config.system_prompt {
            info!("OpenAiBrain system prompt fingerprint: {}", hash_prompt(prompt));
        }
        info!(
            "OpenAiBrain initialized with model: {}, max_tokens: {}",
            config.model, config.max_tokens
        );

        Ok(Self { client, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn chat_completion(&self, user_text: &str) -> Result<ChatCompletionResponse, BrainError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url.trim_end_matches('/'));

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: single_turn(self.config.system_prompt.as_deref(), user_text),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending chat completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BrainError::Timeout
                } else {
                    BrainError::Network(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(BrainError::ProcessingFailed(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(BrainError::ProcessingFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl Brain for OpenAiBrain {
    async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
        let completion = self.chat_completion(&message.text).await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string());

        Ok(OutboundMessage::reply_to(&message, text))
    }

    fn name(&self) -> &str {
        "OpenAiBrain"
    }
}
