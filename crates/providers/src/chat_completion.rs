//! OpenAI-style chat completion adapter.

use std::sync::Arc;
use std::time::Duration;

use chat_core::{async_trait, FormattedConversation, ModelPicker, Provider, ProviderError};
use tracing::debug;

use crate::api_types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::config::ProviderConfig;
use crate::http::{send_checked, DynHttpTransport, HttpRequest};

/// Adapter for providers speaking `{model, messages, temperature, max_tokens}`.
///
/// Groq, OpenRouter, Together.ai and xAI all use this shape. With several
/// configured models, each call picks one through the [`ModelPicker`].
pub struct ChatCompletionProvider {
    config: ProviderConfig,
    transport: DynHttpTransport,
    picker: Arc<dyn ModelPicker>,
}

impl ChatCompletionProvider {
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

    fn model(&self) -> Result<&str, ProviderError> {
        self.picker
            .pick_model(&self.config.models)
            .ok_or_else(|| ProviderError::Configuration("no model configured".to_string()))
    }
}

#[async_trait]
impl Provider for ChatCompletionProvider {
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
        let body = ChatCompletionRequest {
            model: self.model()?,
            messages: conversation.with_system_message(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let request = HttpRequest::post_json(&self.config.api_url, &body)?
            .with_headers(self.config.request_headers())
            .with_timeout(self.config.timeout);

        debug!(provider = %self.config.id, model = body.model, "Sending chat completion");
        let response = send_checked(self.transport.as_ref(), &self.config.id, request).await?;
        let completion: ChatCompletionResponse = response.json()?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse("no message content in choices".to_string()))
    }
}
