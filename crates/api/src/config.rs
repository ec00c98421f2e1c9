//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use agent_tools::ToolsConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Attach upstream error text to 500 responses as `details`.
    pub expose_errors: bool,
    /// Tool endpoints, keys and timeouts.
    pub tools: ToolsConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ASSISTANT_ADDR` | Server bind address | `127.0.0.1:3000` |
    /// | `ASSISTANT_EXPOSE_ERRORS` | Include error details in 500 bodies | `false` |
    ///
    /// Tool settings are read by [`ToolsConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("ASSISTANT_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let expose_errors = env::var("ASSISTANT_EXPOSE_ERRORS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Ok(Self {
            addr,
            expose_errors,
            tools: ToolsConfig::from_env(),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ASSISTANT_ADDR format")]
    InvalidAddr,
}
