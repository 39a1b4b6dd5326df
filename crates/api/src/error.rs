//! Error types for the chat HTTP API.

use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orchestrator::OrchestratorError;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by request handlers.
///
/// Every variant renders as `{"status": <code>, "detail": <message>}`. The
/// detail is a fixed message; provider output never reaches the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be read as a chat request.
    #[error("Malformed request: {0}")]
    BadRequest(#[from] JsonRejection),

    /// Dispatch failed.
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

#[derive(Serialize)]
struct ErrorBody {
    status: u16,
    detail: &'static str,
}

impl ApiError {
    fn status_and_detail(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                "Request body must be JSON of the form {\"messages\": [{\"role\", \"content\"}]}",
            ),
            ApiError::Orchestrator(OrchestratorError::EmptyConversation) => (
                StatusCode::BAD_REQUEST,
                "Conversation contains no user or assistant messages",
            ),
            ApiError::Orchestrator(OrchestratorError::AllProvidersExhausted { .. }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "No model provider is available right now",
            ),
            ApiError::Orchestrator(OrchestratorError::RequestTimeout) => (
                StatusCode::GATEWAY_TIMEOUT,
                "Model providers did not answer in time",
            ),
            ApiError::Orchestrator(OrchestratorError::Internal(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();

        match &self {
            ApiError::Orchestrator(OrchestratorError::AllProvidersExhausted { last_error }) => {
                let last_error = last_error.as_ref().map(|e| e.kind()).unwrap_or("none");
                tracing::warn!(last_error, "Chat request failed: all providers exhausted");
            }
            err if status.is_server_error() => tracing::error!("Chat request failed: {}", err),
            err => tracing::debug!("Chat request rejected: {}", err),
        }

        let body = ErrorBody {
            status: status.as_u16(),
            detail,
        };

        (status, Json(body)).into_response()
    }
}

/// Response for a handler that panicked, installed through
/// `tower_http::catch_panic::CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!("Request handler panicked: {}", message);

    ApiError::from(OrchestratorError::Internal(message)).into_response()
}

/// Result type for request handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
