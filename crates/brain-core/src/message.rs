//! Message types passed to and returned from a brain.

use serde::{Deserialize, Serialize};

/// A message from a user, addressed to a brain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Who sent the message (a session or channel label).
    pub sender: String,
    /// Message text.
    pub text: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
}

impl InboundMessage {
    /// Create a direct message.
    pub fn direct(sender: impl Into<String>, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            timestamp,
        }
    }
}

/// A reply produced by a brain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Who the reply is for.
    pub recipient: String,
    /// Reply text.
    pub text: String,
}

impl OutboundMessage {
    /// Create a reply addressed to the sender of `message`.
    pub fn reply_to(message: &InboundMessage, text: impl Into<String>) -> Self {
        Self {
            recipient: message.sender.clone(),
            text: text.into(),
        }
    }
}
