//! Ordered provider chains.
//!
//! Each external data source in this crate is reached through a list of
//! interchangeable providers. A [`FallbackChain`] tries them in order, bounds
//! every attempt with a timeout, and stops at the first success. Failures are
//! logged and never surfaced individually; the caller only sees
//! [`ToolError::Exhausted`] when every tier has failed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::ToolError;

/// One way of answering a query of type `Q` with a value of type `T`.
#[async_trait]
pub trait Provider<Q: ?Sized + Sync + 'static, T: Send + 'static>: Send + Sync {
    /// Short name used in logs and in [`Resolved::provider`].
    fn name(&self) -> &str;

    /// Per-provider time bound. `None` uses the chain default.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Make one attempt. Any error advances the chain to the next provider.
    async fn attempt(&self, query: &Q) -> Result<T, ToolError>;
}

/// A successful chain result and the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub provider: String,
}

/// An ordered list of providers tried until one succeeds.
pub struct FallbackChain<Q: ?Sized + Sync + 'static, T: Send + 'static> {
    label: String,
    providers: Vec<Arc<dyn Provider<Q, T>>>,
    default_timeout: Duration,
}

impl<Q: ?Sized + Sync + 'static, T: Send + 'static> FallbackChain<Q, T> {
    /// Create an empty chain. `label` names the data source in logs and errors.
    pub fn new(label: impl Into<String>, default_timeout: Duration) -> Self {
        Self {
            label: label.into(),
            providers: Vec::new(),
            default_timeout,
        }
    }

    /// Append a provider to the end of the chain.
    pub fn with_provider<P: Provider<Q, T> + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Append a shared provider to the end of the chain.
    pub fn push(&mut self, provider: Arc<dyn Provider<Q, T>>) {
        self.providers.push(provider);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in the order they are tried.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Try each provider in order and return the first success.
    pub async fn run(&self, query: &Q) -> Result<Resolved<T>, ToolError> {
        for provider in &self.providers {
            let limit = provider.timeout().unwrap_or(self.default_timeout);
            debug!("{}: trying provider '{}'", self.label, provider.name());

            match timeout(limit, provider.attempt(query)).await {
                Ok(Ok(value)) => {
                    debug!("{}: provider '{}' succeeded", self.label, provider.name());
                    return Ok(Resolved {
                        value,
                        provider: provider.name().to_string(),
                    });
                }
                Ok(Err(e)) => {
                    warn!("{}: provider '{}' failed: {}", self.label, provider.name(), e);
                }
                Err(_) => {
                    warn!(
                        "{}: provider '{}' timed out after {:?}",
                        self.label,
                        provider.name(),
                        limit
                    );
                }
            }
        }

        Err(ToolError::Exhausted(self.label.clone()))
    }
}
