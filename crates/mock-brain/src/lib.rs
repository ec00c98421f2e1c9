//! Mock brain implementations for exercising the chat responder.
//!
//! - `EchoBrain` - Echoes messages back, optionally with a prefix
//! - `DelayedBrain` - Wraps another brain with artificial delay
//! - `FailingBrain` - Always fails, to drive the fallback tier
//!
//! For a real model, use the `llm-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, EchoBrain, InboundMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = EchoBrain::new();
//!     let message = InboundMessage::direct("web", "Hello!", 1234567890);
//!
//!     let response = brain.process(message).await?;
//!     println!("Response: {}", response.text);
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod failing;

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, InboundMessage, OutboundMessage};

pub use delayed::DelayedBrain;
pub use echo::EchoBrain;
pub use failing::FailingBrain;
