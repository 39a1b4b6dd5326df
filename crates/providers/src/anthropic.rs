//! Anthropic messages API adapter.

use std::sync::Arc;
use std::time::Duration;

use chat_core::{async_trait, FormattedConversation, ModelPicker, Provider, ProviderError};
use tracing::debug;

use crate::api_types::{AnthropicRequest, AnthropicResponse};
use crate::config::{ProviderConfig, DEFAULT_SYSTEM_PROMPT};
use crate::http::{send_checked, DynHttpTransport, HttpRequest};

const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Adapter for the Anthropic messages API.
///
/// The system prompt travels in its own field rather than in the message list.
pub struct AnthropicProvider {
    config: ProviderConfig,
    transport: DynHttpTransport,
    picker: Arc<dyn ModelPicker>,
}

impl AnthropicProvider {
    pub fn new(
        config: ProviderConfig,
        transport: DynHttpTransport,
        picker: Arc<dyn ModelPicker>,
    ) -> Self {
        Self {
            config,
            transport,
            picker,
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.config.id
    }

    fn marker(&self) -> &str {
        &self.config.marker
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }

    async fn complete(&self, conversation: &FormattedConversation) -> Result<String, ProviderError> {
        let model = self
            .picker
            .pick_model(&self.config.models)
            .ok_or_else(|| ProviderError::Configuration("no model configured".to_string()))?;

        let body = AnthropicRequest {
            model,
            max_tokens: self.config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: self.config.temperature,
            system: conversation
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            messages: &conversation.messages,
        };

        let request = HttpRequest::post_json(&self.config.api_url, &body)?
            .with_headers(self.config.request_headers())
            .with_timeout(self.config.timeout);

        debug!(provider = %self.config.id, %model, "Sending messages request");
        let response = send_checked(self.transport.as_ref(), &self.config.id, request).await?;
        let parsed: AnthropicResponse = response.json()?;

        parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| ProviderError::MalformedResponse("no text content block".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::ScriptedTransport;
    use chat_core::{format_conversation, Message, Outcome, RandomPicker};
    use serde_json::json;

    fn config() -> ProviderConfig {
        ProviderConfig {
            api_key: Some("sk-ant-test".to_string()),
            ..ProviderConfig::builtin("anthropic").unwrap()
        }
    }

    #[tokio::test]
    async fn test_system_prompt_in_top_level_field() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!({"content": [{"type": "text", "text": "Sure."}]}));
        let provider = AnthropicProvider::new(config(), transport.clone(), Arc::new(RandomPicker));

        let conversation =
            format_conversation(&[Message::system("be precise"), Message::user("hi")]);
        let result = provider.execute(&conversation).await;
        assert_eq!(
            result.outcome,
            Outcome::Success("🔥 [Claude 3.5 Sonnet]: Sure.".to_string())
        );

        let body = transport.request_json(0);
        assert_eq!(body["system"], "be precise");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");

        let request = &transport.requests()[0];
        assert_eq!(request.header("x-api-key"), Some("sk-ant-test"));
        assert_eq!(request.header("anthropic-version"), Some("2023-06-01"));
        assert_eq!(request.header("authorization"), None);
    }

    #[tokio::test]
    async fn test_default_system_prompt() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!({"content": [{"type": "text", "text": "ok"}]}));
        let provider = AnthropicProvider::new(config(), transport.clone(), Arc::new(RandomPicker));

        provider
            .complete(&format_conversation(&[Message::user("hi")]))
            .await
            .unwrap();
        assert_eq!(transport.request_json(0)["system"], DEFAULT_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn test_empty_content_is_malformed() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!({"content": []}));
        let provider = AnthropicProvider::new(config(), transport, Arc::new(RandomPicker));

        let err = provider
            .complete(&format_conversation(&[Message::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }
}
