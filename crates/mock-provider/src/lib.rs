//! Mock provider implementations for dispatch tests.
//!
//! This crate provides mock implementations of the `Provider` trait:
//! - `ScriptedProvider` - Returns a fixed reply or error and counts calls
//! - `DelayedProvider` - Wraps another provider with artificial delay
//! - `PanickingProvider` - Panics inside `complete`
//!
//! For real providers, use the `providers` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_provider::{format_conversation, Message, Provider, ScriptedProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = ScriptedProvider::succeed("primary", "Hello!");
//!     let conversation = format_conversation(&[Message::user("hi")]);
//!
//!     let result = provider.execute(&conversation).await;
//!     assert_eq!(result.text(), Some("Hello!"));
//!     assert_eq!(provider.calls(), 1);
//! }
//! ```

mod delayed;
mod panicking;
mod scripted;

// Re-export chat-core types for convenience
pub use chat_core::{
    async_trait, format_conversation, FormattedConversation, Message, Outcome, Provider,
    ProviderError, ProviderResult,
};

pub use delayed::DelayedProvider;
pub use panicking::PanickingProvider;
pub use scripted::ScriptedProvider;
