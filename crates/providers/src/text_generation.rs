//! Flattened-prompt text generation adapter.

use std::sync::Arc;
use std::time::Duration;

use chat_core::{
    async_trait, flatten_prompt, FormattedConversation, ModelPicker, PromptStyle, Provider,
    ProviderError,
};
use tracing::{debug, info};

use crate::api_types::{TextGenerationParameters, TextGenerationRequest, TextGenerationResponse};
use crate::config::ProviderConfig;
use crate::http::{check_status, DynHttpTransport, HttpRequest};

/// Status a text generation endpoint returns while the model is loading.
const MODEL_LOADING: u16 = 503;

const DEFAULT_MAX_NEW_TOKENS: u32 = 1024;

/// Adapter for `{inputs, parameters}` endpoints with the model in the URL path.
///
/// Each call picks one model from the configured set through the injected
/// [`ModelPicker`]. A "model loading" response is retried within the
/// configured [`RetryPolicy`](chat_core::RetryPolicy).
pub struct TextGenerationProvider {
    config: ProviderConfig,
    style: PromptStyle,
    transport: DynHttpTransport,
    picker: Arc<dyn ModelPicker>,
}

impl TextGenerationProvider {
    pub fn new(
        config: ProviderConfig,
        style: PromptStyle,
        transport: DynHttpTransport,
        picker: Arc<dyn ModelPicker>,
    ) -> Self {
        Self {
            config,
            style,
            transport,
            picker,
        }
    }

    fn build_request(&self, model: &str, prompt: &str) -> Result<HttpRequest, ProviderError> {
        let body = TextGenerationRequest {
            inputs: prompt.to_string(),
            parameters: TextGenerationParameters {
                max_new_tokens: self.config.max_tokens.unwrap_or(DEFAULT_MAX_NEW_TOKENS),
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                return_full_text: false,
            },
        };

        Ok(
            HttpRequest::post_json(format!("{}/{}", self.config.api_url, model), &body)?
                .with_headers(self.config.request_headers())
                .with_timeout(self.config.timeout),
        )
    }
}

#[async_trait]
impl Provider for TextGenerationProvider {
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
        let prompt = flatten_prompt(conversation, self.style);
        let retry = self.config.retry;
        let mut retries = 0;

        debug!(provider = %self.config.id, %model, "Sending text generation request");

        let response = loop {
            let request = self.build_request(model, &prompt)?;
            let response = self.transport.send(request).await?;

            if response.status != MODEL_LOADING || !retry.allows(retries) {
                break response;
            }

            let wait = retry.delay_for(response.retry_after());
            retries += 1;
            info!(
                provider = %self.config.id,
                %model,
                retry = retries,
                wait_ms = wait.as_millis() as u64,
                "Model loading, retrying"
            );
            tokio::time::sleep(wait).await;
        };

        let generated: TextGenerationResponse = check_status(&self.config.id, response)?.json()?;
        generated
            .into_text()
            .ok_or_else(|| ProviderError::MalformedResponse("no generated_text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::ScriptedTransport;
    use crate::http::HttpResponse;
    use chat_core::{format_conversation, Message, Outcome, RetryPolicy, RoundRobinPicker};
    use serde_json::json;
    use std::collections::HashMap;

    fn config(retry: RetryPolicy) -> ProviderConfig {
        ProviderConfig {
            api_key: Some("hf_test".to_string()),
            api_url: "http://hf.test/models".to_string(),
            retry,
            ..ProviderConfig::builtin("huggingface").unwrap()
        }
    }

    fn provider(transport: DynHttpTransport, retry: RetryPolicy) -> TextGenerationProvider {
        TextGenerationProvider::new(
            config(retry),
            PromptStyle::ChatTokens,
            transport,
            Arc::new(RoundRobinPicker::new()),
        )
    }

    fn loading(retry_after: Option<&str>) -> HttpResponse {
        let mut headers = HashMap::new();
        if let Some(value) = retry_after {
            headers.insert("retry-after".to_string(), value.to_string());
        }
        HttpResponse {
            status: 503,
            headers,
            body: br#"{"error":"Model is currently loading"}"#.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_flattened_prompt_and_rotation() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!([{"generated_text": "first"}]));
        transport.push_json(200, json!({"generated_text": "second"}));
        let provider = provider(transport.clone(), RetryPolicy::none());

        let conversation = format_conversation(&[Message::system("sys"), Message::user("hi")]);
        let first = provider.execute(&conversation).await;
        let second = provider.execute(&conversation).await;
        assert_eq!(first.outcome, Outcome::Success("🤗 first".to_string()));
        assert_eq!(second.outcome, Outcome::Success("🤗 second".to_string()));

        let requests = transport.requests();
        assert_eq!(
            requests[0].url,
            "http://hf.test/models/mistralai/Mistral-7B-Instruct-v0.2"
        );
        assert_eq!(requests[1].url, "http://hf.test/models/HuggingFaceH4/zephyr-7b-beta");

        let body = transport.request_json(0);
        assert_eq!(
            body["inputs"],
            "<|system|>\nsys\n<|user|>\nhi\n<|assistant|>\n"
        );
        assert_eq!(body["parameters"]["max_new_tokens"], 1024);
        assert_eq!(body["parameters"]["return_full_text"], false);
    }

    #[tokio::test]
    async fn test_model_loading_retried_once() {
        let transport = ScriptedTransport::new();
        transport.push(Ok(loading(Some("0"))));
        transport.push_json(200, json!([{"generated_text": "warm now"}]));
        let provider = provider(
            transport.clone(),
            RetryPolicy::fixed(1, Duration::from_millis(5)),
        );

        let text = provider
            .complete(&format_conversation(&[Message::user("hi")]))
            .await
            .unwrap();
        assert_eq!(text, "warm now");
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_retry_bound_respected() {
        let transport = ScriptedTransport::new();
        transport.push(Ok(loading(None)));
        transport.push(Ok(loading(None)));
        transport.push_json(200, json!([{"generated_text": "never reached"}]));
        let provider = provider(
            transport.clone(),
            RetryPolicy::fixed(1, Duration::from_millis(5)),
        );

        let err = provider
            .complete(&format_conversation(&[Message::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Http { status: 503, .. }));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_list_is_malformed() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!([]));
        let provider = provider(transport, RetryPolicy::none());

        let err = provider
            .complete(&format_conversation(&[Message::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }
}
