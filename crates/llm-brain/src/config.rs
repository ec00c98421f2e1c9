//! Configuration for the language-model brains.

use brain_core::BrainError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default OpenAI-compatible API URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// Default local Ollama URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Which model server to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// OpenAI chat completions (or any compatible server).
    OpenAi,
    /// A local Ollama daemon.
    Ollama,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Ollama => "ollama",
        }
    }

    fn default_url(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => DEFAULT_OPENAI_URL,
            LlmProvider::Ollama => DEFAULT_OLLAMA_URL,
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-3.5-turbo",
            LlmProvider::Ollama => "llama3",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = BrainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(BrainError::Configuration(format!(
                "unknown LLM_PROVIDER '{}'",
                other
            ))),
        }
    }
}

/// Configuration for a language-model brain.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model server kind.
    pub provider: LlmProvider,

    /// Base URL of the model server.
    pub api_url: String,

    /// API key (required for OpenAI, ignored by Ollama).
    pub api_key: Option<String>,

    /// Model name to use.
    pub model: String,

    /// Optional system prompt sent before the user message.
    pub system_prompt: Option<String>,

    /// Token budget for a single reply.
    pub max_tokens: u32,

    /// Temperature for generation (0.0 - 2.0).
    pub temperature: f32,

    /// Upper bound on a single model call.
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::for_provider(LlmProvider::OpenAi)
    }
}

impl LlmConfig {
    /// Defaults for the given provider.
    pub fn for_provider(provider: LlmProvider) -> Self {
        Self {
            provider,
            api_url: provider.default_url().to_string(),
            api_key: None,
            model: provider.default_model().to_string(),
            system_prompt: None,
            max_tokens: 500,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Provider selection:
    /// - `LLM_PROVIDER` - `openai` or `ollama` (explicit)
    /// - otherwise `openai` when `OPENAI_API_KEY` is set
    /// - otherwise `ollama` when `OLLAMA_URL` is set
    /// - otherwise no model is configured and an error is returned
    ///
    /// Optional environment variables:
    /// - `OPENAI_API_URL` / `OPENAI_MODEL`
    /// - `OLLAMA_URL` / `OLLAMA_MODEL`
    /// - `LLM_MAX_TOKENS` (default: 500)
    /// - `LLM_TEMPERATURE` (default: 0.7)
    /// - `LLM_TIMEOUT_SECS` (default: 30)
    /// - `ASSISTANT_SYSTEM_PROMPT`
    pub fn from_env() -> Result<Self, BrainError> {
        let openai_key = non_empty_var("OPENAI_API_KEY");
        let ollama_url = non_empty_var("OLLAMA_URL");

        let provider = match non_empty_var("LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None if openai_key.is_some() => LlmProvider::OpenAi,
            None if ollama_url.is_some() => LlmProvider::Ollama,
            None => {
                return Err(BrainError::Configuration(
                    "no language model configured (set OPENAI_API_KEY or OLLAMA_URL)".to_string(),
                ))
            }
        };

        let mut config = Self::for_provider(provider);

        match provider {
            LlmProvider::OpenAi => {
                config.api_key = Some(openai_key.ok_or_else(|| {
                    BrainError::Configuration("OPENAI_API_KEY not set".to_string())
                })?);
                if let Some(url) = non_empty_var("OPENAI_API_URL") {
                    config.api_url = url;
                }
                if let Some(model) = non_empty_var("OPENAI_MODEL") {
                    config.model = model;
                }
            }
            LlmProvider::Ollama => {
                if let Some(url) = ollama_url {
                    config.api_url = url;
                }
                if let Some(model) = non_empty_var("OLLAMA_MODEL") {
                    config.model = model;
                }
            }
        }

        config.system_prompt = non_empty_var("ASSISTANT_SYSTEM_PROMPT");

        if let Some(tokens) = env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()) {
            config.max_tokens = tokens;
        }
        if let Some(temp) = env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()) {
            config.temperature = temp;
        }
        if let Some(secs) = env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Create a new config builder.
    pub fn builder(provider: LlmProvider) -> LlmConfigBuilder {
        LlmConfigBuilder {
            config: Self::for_provider(provider),
        }
    }
}

/// Builder for LlmConfig.
#[derive(Debug)]
pub struct LlmConfigBuilder {
    config: LlmConfig,
}

impl LlmConfigBuilder {
    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = tokens;
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = temp;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> LlmConfig {
        self.config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
