//! Delayed provider implementation - wraps another provider with artificial delay.

use std::time::Duration;

use chat_core::{async_trait, FormattedConversation, Provider, ProviderError};
use tokio::time::sleep;

/// A provider that wraps another provider and adds artificial delay.
///
/// Useful for testing timeout handling and completion order in parallel
/// dispatch.
pub struct DelayedProvider<P: Provider> {
    inner: P,
    delay: Duration,
}

impl<P: Provider> DelayedProvider<P> {
    /// Create a new DelayedProvider wrapping the given provider with the specified delay.
    pub fn new(inner: P, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a provider with a delay in milliseconds.
    pub fn with_millis(inner: P, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<P: Provider> Provider for DelayedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn marker(&self) -> &str {
        self.inner.marker()
    }

    fn timeout(&self) -> Duration {
        self.inner.timeout()
    }

    async fn complete(&self, conversation: &FormattedConversation) -> Result<String, ProviderError> {
        sleep(self.delay).await;
        self.inner.complete(conversation).await
    }
}
