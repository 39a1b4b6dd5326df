//! Core trait and types for chat provider implementations.
//!
//! This crate provides the shared interface used by every provider adapter
//! and by the dispatch engine. It defines:
//!
//! - [`Message`] / [`Role`] - The inbound conversation shape
//! - [`format_conversation`] - Normalization into what providers accept
//! - [`Provider`] - The trait every adapter implements
//! - [`ProviderResult`] / [`ProviderError`] - Per-call outcomes
//! - [`ModelPicker`] - Selection among interchangeable models
//! - [`RetryPolicy`] - Bounds for transient-failure retries
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use chat_core::{async_trait, FormattedConversation, Provider, ProviderError};
//!
//! struct Static;
//!
//! #[async_trait]
//! impl Provider for Static {
//!     fn name(&self) -> &str {
//!         "static"
//!     }
//!
//!     fn timeout(&self) -> Duration {
//!         Duration::from_secs(1)
//!     }
//!
//!     async fn complete(&self, _conversation: &FormattedConversation) -> Result<String, ProviderError> {
//!         Ok("hello".to_string())
//!     }
//! }
//! ```

mod error;
mod formatter;
mod message;
mod prompt;
mod result;
mod retry;
mod rotation;
mod trait_def;

pub use error::ProviderError;
pub use formatter::{format_conversation, FormattedConversation, CONVERSATION_STARTED};
pub use message::{Message, Role};
pub use prompt::{flatten_prompt, PromptStyle};
pub use result::{Outcome, ProviderResult};
pub use retry::RetryPolicy;
pub use rotation::{ModelPicker, RandomPicker, RoundRobinPicker, SeededPicker};
pub use trait_def::Provider;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
