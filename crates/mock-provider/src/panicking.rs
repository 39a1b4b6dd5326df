//! Panicking provider - crashes inside `complete`.

use std::time::Duration;

use chat_core::{async_trait, FormattedConversation, Provider, ProviderError};

/// A provider whose `complete` panics, for exercising crash handling
/// in callers.
#[derive(Debug, Clone)]
pub struct PanickingProvider {
    name: String,
}

impl PanickingProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Provider for PanickingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn complete(&self, conversation: &FormattedConversation) -> Result<String, ProviderError> {
        let empty: Vec<String> = Vec::new();
        let index = conversation.messages.len();
        Ok(empty[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{format_conversation, Message};

    #[tokio::test]
    #[should_panic(expected = "index out of bounds")]
    async fn test_complete_panics() {
        let provider = PanickingProvider::new("crash");
        let _ = provider.execute(&format_conversation(&[Message::user("hi")])).await;
    }
}
