//! Scripted provider - returns a fixed outcome and counts invocations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chat_core::{async_trait, FormattedConversation, Provider, ProviderError};

/// A provider that always answers with the same reply or error.
///
/// The call counter is shared, so a test can keep a handle to it after the
/// provider has been moved into an orchestrator.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    name: String,
    marker: String,
    timeout: Duration,
    response: Result<String, ProviderError>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    fn new(name: impl Into<String>, response: Result<String, ProviderError>) -> Self {
        Self {
            name: name.into(),
            marker: String::new(),
            timeout: Duration::from_secs(30),
            response,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider that succeeds with `text`.
    pub fn succeed(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, Ok(text.into()))
    }

    /// A provider that fails with `error`.
    pub fn fail(name: impl Into<String>, error: ProviderError) -> Self {
        Self::new(name, Err(error))
    }

    /// Tag successful replies with `marker`.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of times `complete` has run.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared handle to the call counter.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn marker(&self) -> &str {
        &self.marker
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn complete(&self, _conversation: &FormattedConversation) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{format_conversation, Message, Outcome};

    #[tokio::test]
    async fn test_succeed_counts_calls() {
        let provider = ScriptedProvider::succeed("a", "hello").with_marker("* ");
        let counter = provider.call_counter();
        let conversation = format_conversation(&[Message::user("hi")]);

        let result = provider.execute(&conversation).await;
        assert_eq!(result.outcome, Outcome::Success("* hello".to_string()));

        provider.execute(&conversation).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fail() {
        let provider = ScriptedProvider::fail("b", ProviderError::Timeout);
        let result = provider
            .execute(&format_conversation(&[Message::user("hi")]))
            .await;
        assert_eq!(result.error(), Some(&ProviderError::Timeout));
        assert_eq!(provider.calls(), 1);
    }
}
