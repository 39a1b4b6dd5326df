//! Provider API request and response types.

use chat_core::Message;
use serde::{Deserialize, Serialize};

/// OpenAI-style chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    /// Model to use
    pub model: &'a str,
    /// Messages in the conversation, system prompt first
    pub messages: Vec<Message>,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Response choices
    pub choices: Vec<Choice>,
}

/// A response choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The message
    pub message: ResponseMessage,
}

/// Response message.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Content (may be null)
    pub content: Option<String>,
}

/// Anthropic messages request.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    /// System prompt travels outside the message list
    pub system: String,
    /// Non-system turns only
    pub messages: &'a [Message],
}

/// Anthropic messages response.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<AnthropicContent>,
}

/// One content block of an Anthropic response.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicContent {
    #[serde(rename = "type", default)]
    pub block_type: Option<String>,
    pub text: Option<String>,
}

/// Flattened-prompt text generation request.
#[derive(Debug, Clone, Serialize)]
pub struct TextGenerationRequest {
    pub inputs: String,
    pub parameters: TextGenerationParameters,
}

/// Sampling parameters for text generation.
#[derive(Debug, Clone, Serialize)]
pub struct TextGenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    pub return_full_text: bool,
}

/// Text generation answers with either a list or a single object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextGenerationResponse {
    Many(Vec<GeneratedText>),
    One(GeneratedText),
}

impl TextGenerationResponse {
    /// The first generated text, if any.
    pub fn into_text(self) -> Option<String> {
        match self {
            TextGenerationResponse::Many(items) => items.into_iter().next().map(|g| g.generated_text),
            TextGenerationResponse::One(item) => Some(item.generated_text),
        }
    }
}

/// A generated text entry.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}

/// Prediction submission.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    pub input: PredictionInput,
}

/// Prediction input fields.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionInput {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Prediction status document, returned both on submit and on poll.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub urls: Option<PredictionUrls>,
    #[serde(default)]
    pub output: Option<PredictionOutput>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// Links attached to a prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionUrls {
    /// Status URL to poll
    pub get: String,
}

/// Prediction output: streamed token chunks or a single string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Chunks(Vec<String>),
    Text(String),
}

impl PredictionOutput {
    /// Concatenate the output into one string.
    pub fn joined(self) -> String {
        match self {
            PredictionOutput::Chunks(chunks) => chunks.concat(),
            PredictionOutput::Text(text) => text,
        }
    }
}

/// Lifecycle state of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionStatus {
    Pending,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    /// Map a wire status string; unknown values are treated as still running.
    pub fn parse(status: &str) -> Self {
        match status {
            "succeeded" => PredictionStatus::Succeeded,
            "failed" => PredictionStatus::Failed,
            "canceled" | "cancelled" => PredictionStatus::Canceled,
            _ => PredictionStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_generation_list_or_object() {
        let many: TextGenerationResponse =
            serde_json::from_str(r#"[{"generated_text":"a"},{"generated_text":"b"}]"#).unwrap();
        assert_eq!(many.into_text().as_deref(), Some("a"));

        let one: TextGenerationResponse =
            serde_json::from_str(r#"{"generated_text":"solo"}"#).unwrap();
        assert_eq!(one.into_text().as_deref(), Some("solo"));

        let empty: TextGenerationResponse = serde_json::from_str("[]").unwrap();
        assert_eq!(empty.into_text(), None);
    }

    #[test]
    fn test_prediction_output_shapes() {
        let chunks: Prediction =
            serde_json::from_str(r#"{"status":"succeeded","output":["Hel","lo"]}"#).unwrap();
        assert_eq!(chunks.output.unwrap().joined(), "Hello");

        let text: Prediction =
            serde_json::from_str(r#"{"status":"succeeded","output":"Hello"}"#).unwrap();
        assert_eq!(text.output.unwrap().joined(), "Hello");
    }

    #[test]
    fn test_prediction_status_parse() {
        assert_eq!(PredictionStatus::parse("starting"), PredictionStatus::Pending);
        assert_eq!(PredictionStatus::parse("processing"), PredictionStatus::Pending);
        assert_eq!(PredictionStatus::parse("succeeded"), PredictionStatus::Succeeded);
        assert_eq!(PredictionStatus::parse("failed"), PredictionStatus::Failed);
        assert_eq!(PredictionStatus::parse("canceled"), PredictionStatus::Canceled);
    }
}
