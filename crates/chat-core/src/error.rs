//! Error types for provider calls.

use thiserror::Error;

/// Errors a single provider call can end with.
///
/// These never escape the adapter boundary as panics; they are carried inside
/// a [`ProviderResult`](crate::ProviderResult) failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// No non-system messages to send.
    #[error("conversation is empty")]
    EmptyConversation,

    /// The provider answered with a non-success status.
    ///
    /// The body is kept for logs only and is left out of the display text.
    #[error("provider returned HTTP {status}")]
    Http { status: u16, body: String },

    /// Network failure or the call exceeded its time budget.
    #[error("provider timed out")]
    Timeout,

    /// The response did not contain the expected fields.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// An asynchronous prediction reached a terminal non-success status.
    #[error("prediction ended with status {0}")]
    PredictionFailed(String),

    /// The adapter could not build a request.
    #[error("provider misconfigured: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Short stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::EmptyConversation => "empty_conversation",
            ProviderError::Http { .. } => "http_error",
            ProviderError::Timeout => "timeout",
            ProviderError::MalformedResponse(_) => "malformed_response",
            ProviderError::PredictionFailed(_) => "prediction_failed",
            ProviderError::Configuration(_) => "configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_display_hides_body() {
        let err = ProviderError::Http {
            status: 401,
            body: "invalid key sk-secret".to_string(),
        };
        let text = err.to_string();
        assert_eq!(text, "provider returned HTTP 401");
        assert!(!text.contains("sk-secret"));
    }
}
