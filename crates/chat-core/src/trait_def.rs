//! The Provider trait definition.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::formatter::FormattedConversation;
use crate::result::ProviderResult;

/// A trait for turning a conversation into a reply through one external service.
///
/// Implementations translate the conversation into their provider's wire
/// format and back. This trait is object-safe and can be used with
/// `Arc<dyn Provider>`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier used in logs, health output and failure placeholders.
    fn name(&self) -> &str;

    /// Short tag prepended to every successful reply.
    fn marker(&self) -> &str {
        ""
    }

    /// Upper bound for a single call, retries and polling included.
    fn timeout(&self) -> Duration;

    /// Perform the provider call and return the untagged reply text.
    ///
    /// Callers guarantee the conversation is not empty.
    async fn complete(&self, conversation: &FormattedConversation) -> Result<String, ProviderError>;

    /// Run one bounded call and capture its outcome.
    ///
    /// Never fails: empty conversations, errors and elapsed timeouts all become
    /// a failure result. The provider is not contacted for an empty
    /// conversation.
    async fn execute(&self, conversation: &FormattedConversation) -> ProviderResult {
        let started = Instant::now();

        if conversation.is_empty() {
            return ProviderResult::failure(
                self.name(),
                self.marker(),
                ProviderError::EmptyConversation,
                started.elapsed(),
            );
        }

        let outcome = tokio::time::timeout(self.timeout(), self.complete(conversation)).await;
        let latency = started.elapsed();

        match outcome {
            Ok(Ok(text)) => ProviderResult::success(
                self.name(),
                self.marker(),
                format!("{}{}", self.marker(), text),
                latency,
            ),
            Ok(Err(err)) => ProviderResult::failure(self.name(), self.marker(), err, latency),
            Err(_) => ProviderResult::failure(
                self.name(),
                self.marker(),
                ProviderError::Timeout,
                latency,
            ),
        }
    }
}
