//! Echo brain implementation - echoes messages back.

use brain_core::{async_trait, Brain, BrainError, InboundMessage, OutboundMessage};

/// A simple brain that echoes messages back to the sender.
///
/// An empty prefix-less echo of an empty message yields an empty reply,
/// which is handy for testing how callers treat blank model output.
#[derive(Debug, Clone, Default)]
pub struct EchoBrain {
    prefix: Option<String>,
}

impl EchoBrain {
    /// Create a new EchoBrain with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoBrain with a custom prefix.
    ///
    /// ```rust
    /// use mock_brain::EchoBrain;
    ///
    /// let brain = EchoBrain::with_prefix("Echo: ");
    /// // Will respond with "Echo: <original message>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl Brain for EchoBrain {
    async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
        let response_text = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, message.text),
            None => message.text.clone(),
        };

        Ok(OutboundMessage::reply_to(&message, response_text))
    }

    fn name(&self) -> &str {
        "EchoBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_no_prefix() {
        let brain = EchoBrain::new();
        let msg = InboundMessage::direct("web", "Hello!", 1234567890);

        let response = brain.process(msg).await.unwrap();
        assert_eq!(response.text, "Hello!");
        assert_eq!(response.recipient, "web");
    }

    #[tokio::test]
    async fn test_echo_with_prefix() {
        let brain = EchoBrain::with_prefix("Echo: ");
        let msg = InboundMessage::direct("web", "Hello!", 1234567890);

        let response = brain.process(msg).await.unwrap();
        assert_eq!(response.text, "Echo: Hello!");
    }

    #[tokio::test]
    async fn test_brain_is_ready() {
        let brain = EchoBrain::new();
        assert!(brain.is_ready().await);
        assert_eq!(brain.name(), "EchoBrain");
    }
}
