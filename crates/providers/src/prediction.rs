//! Submit/poll prediction adapter.

use std::sync::Arc;
use std::time::Duration;

use chat_core::{
    async_trait, flatten_prompt, FormattedConversation, ModelPicker, PromptStyle, Provider,
    ProviderError,
};
use tracing::{debug, warn};

use crate::api_types::{Prediction, PredictionInput, PredictionRequest, PredictionStatus};
use crate::config::ProviderConfig;
use crate::http::{send_checked, DynHttpTransport, HttpRequest};

const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Adapter for providers that run completions as asynchronous prediction jobs.
///
/// A job is submitted, then its status URL is polled at a fixed interval up
/// to the configured number of times. A job still running after the last poll
/// counts as a timeout.
pub struct PredictionProvider {
    config: ProviderConfig,
    style: PromptStyle,
    transport: DynHttpTransport,
    picker: Arc<dyn ModelPicker>,
}

impl PredictionProvider {
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

    async fn submit(&self, model: &str, prompt: String) -> Result<Prediction, ProviderError> {
        let body = PredictionRequest {
            input: PredictionInput {
                prompt,
                max_tokens: self.config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                temperature: self.config.temperature,
            },
        };
        let url = format!("{}/{}/predictions", self.config.api_url, model);
        let request = HttpRequest::post_json(url, &body)?
            .with_headers(self.config.request_headers())
            .with_timeout(self.config.timeout);

        send_checked(self.transport.as_ref(), &self.config.id, request)
            .await?
            .json()
    }

    async fn fetch(&self, url: &str) -> Result<Prediction, ProviderError> {
        let request = HttpRequest::get(url)
            .with_headers(self.config.request_headers())
            .with_timeout(self.config.timeout);

        send_checked(self.transport.as_ref(), &self.config.id, request)
            .await?
            .json()
    }

    /// Resolve a prediction document to text, or `None` while it is still running.
    fn settle(&self, prediction: Prediction) -> Result<Option<String>, ProviderError> {
        match PredictionStatus::parse(&prediction.status) {
            PredictionStatus::Pending => Ok(None),
            PredictionStatus::Succeeded => prediction
                .output
                .map(|output| Some(output.joined()))
                .ok_or_else(|| {
                    ProviderError::MalformedResponse("succeeded prediction has no output".to_string())
                }),
            PredictionStatus::Failed | PredictionStatus::Canceled => {
                if let Some(error) = &prediction.error {
                    debug!(provider = %self.config.id, %error, "Prediction error detail");
                }
                Err(ProviderError::PredictionFailed(prediction.status))
            }
        }
    }
}

#[async_trait]
impl Provider for PredictionProvider {
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

        let submitted = self.submit(model, prompt).await?;
        debug!(provider = %self.config.id, id = ?submitted.id, "Prediction submitted");
        let status_url = submitted.urls.as_ref().map(|urls| urls.get.clone());

        // A prediction can finish synchronously; only polling needs the url.
        if let Some(text) = self.settle(submitted)? {
            return Ok(text);
        }
        let status_url = status_url
            .ok_or_else(|| ProviderError::MalformedResponse("prediction has no status url".to_string()))?;

        let poll = self.config.poll;
        for attempt in 1..=poll.max_polls {
            tokio::time::sleep(poll.interval).await;
            let prediction = self.fetch(&status_url).await?;
            debug!(provider = %self.config.id, attempt, status = %prediction.status, "Prediction polled");
            if let Some(text) = self.settle(prediction)? {
                return Ok(text);
            }
        }

        warn!(
            provider = %self.config.id,
            polls = poll.max_polls,
            "Prediction still running after last poll"
        );
        Err(ProviderError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PollPolicy;
    use crate::http::testing::ScriptedTransport;
    use crate::http::HttpMethod;
    use chat_core::{format_conversation, Message, Outcome, RandomPicker};
    use serde_json::json;

    fn provider(transport: DynHttpTransport, max_polls: u32) -> PredictionProvider {
        let config = ProviderConfig {
            api_key: Some("r8_test".to_string()),
            api_url: "http://replicate.test/v1/models".to_string(),
            poll: PollPolicy {
                interval: Duration::from_millis(1),
                max_polls,
            },
            ..ProviderConfig::builtin("replicate").unwrap()
        };
        PredictionProvider::new(config, PromptStyle::Bracketed, transport, Arc::new(RandomPicker))
    }

    fn submitted() -> serde_json::Value {
        json!({
            "id": "p1",
            "status": "starting",
            "urls": {"get": "http://replicate.test/v1/predictions/p1"}
        })
    }

    #[tokio::test]
    async fn test_submit_then_poll_until_done() {
        let transport = ScriptedTransport::new();
        transport.push_json(201, submitted());
        transport.push_json(200, json!({"status": "processing"}));
        transport.push_json(200, json!({"status": "succeeded", "output": ["Hel", "lo"]}));
        let provider = provider(transport.clone(), 5);

        let conversation = format_conversation(&[Message::system("sys"), Message::user("hi")]);
        let result = provider.execute(&conversation).await;
        assert_eq!(result.outcome, Outcome::Success("🦙 Hello".to_string()));

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[0].url,
            "http://replicate.test/v1/models/meta/meta-llama-3-70b-instruct/predictions"
        );
        assert_eq!(requests[1].method, HttpMethod::Get);
        assert_eq!(requests[1].url, "http://replicate.test/v1/predictions/p1");
        assert_eq!(requests[1].header("authorization"), Some("Bearer r8_test"));

        let body = transport.request_json(0);
        assert_eq!(
            body["input"]["prompt"],
            "[SYSTEM]\nsys\n[USER]\nhi\n[ASSISTANT]\n"
        );
        assert_eq!(body["input"]["max_tokens"], 1024);
    }

    #[tokio::test]
    async fn test_not_terminal_after_last_poll_is_timeout() {
        let transport = ScriptedTransport::new();
        transport.push_json(201, submitted());
        transport.push_json(200, json!({"status": "processing"}));
        transport.push_json(200, json!({"status": "processing"}));
        let provider = provider(transport.clone(), 2);

        let err = provider
            .complete(&format_conversation(&[Message::user("hi")]))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::Timeout);
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_prediction() {
        let transport = ScriptedTransport::new();
        transport.push_json(201, submitted());
        transport.push_json(200, json!({"status": "failed", "error": "out of memory"}));
        let provider = provider(transport, 3);

        let err = provider
            .complete(&format_conversation(&[Message::user("hi")]))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::PredictionFailed("failed".to_string()));
    }

    #[tokio::test]
    async fn test_completed_on_submit_needs_no_status_url() {
        let transport = ScriptedTransport::new();
        transport.push_json(201, json!({"id": "p2", "status": "succeeded", "output": "done"}));
        let provider = provider(transport.clone(), 3);

        let text = provider
            .complete(&format_conversation(&[Message::user("hi")]))
            .await
            .unwrap();
        assert_eq!(text, "done");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_on_submit_without_status_url() {
        let transport = ScriptedTransport::new();
        transport.push_json(201, json!({"status": "failed", "error": "bad input"}));
        let provider = provider(transport, 3);

        let err = provider
            .complete(&format_conversation(&[Message::user("hi")]))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::PredictionFailed("failed".to_string()));
    }

    #[tokio::test]
    async fn test_missing_status_url_is_malformed() {
        let transport = ScriptedTransport::new();
        transport.push_json(201, json!({"status": "starting"}));
        let provider = provider(transport, 3);

        let err = provider
            .complete(&format_conversation(&[Message::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }
}
