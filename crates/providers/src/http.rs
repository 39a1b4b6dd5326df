//! Transport abstraction that decouples adapters from the concrete HTTP client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chat_core::ProviderError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// HTTP methods the adapters use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Minimal HTTP request shared across adapters.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Build a POST request carrying `body` as JSON.
    pub fn post_json<T: Serialize>(url: impl Into<String>, body: &T) -> Result<Self, ProviderError> {
        let payload = serde_json::to_vec(body).map_err(|err| {
            ProviderError::Configuration(format!("failed to serialize request: {err}"))
        })?;

        Ok(Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(payload),
            timeout: None,
        })
    }

    /// Build a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// Append headers.
    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Look up a header value, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Minimal HTTP response.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn a non-success status into [`ProviderError::Http`].
    pub fn error_for_status(self) -> Result<Self, ProviderError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ProviderError::Http {
                status: self.status,
                body: self.text(),
            })
        }
    }

    /// Decode the body, reporting shape mismatches as malformed responses.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ProviderError> {
        serde_json::from_slice(&self.body)
            .map_err(|err| ProviderError::MalformedResponse(format!("unexpected body: {err}")))
    }

    /// Parse a numeric `Retry-After` header.
    ///
    /// HTTP-date values are ignored; providers use the numeric form.
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("retry-after"))
            .and_then(|(_, value)| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}

/// Errors raised before any HTTP status is available.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// Connecting or resolving the host failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other client-side failure.
    #[error("transport error: {0}")]
    Other(String),
}

impl From<TransportError> for ProviderError {
    fn from(_: TransportError) -> Self {
        ProviderError::Timeout
    }
}

/// Sends requests for the adapters.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and resolve when the full response is available.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Thread-safe handle to a transport implementation.
pub type DynHttpTransport = Arc<dyn HttpTransport>;

/// Send a request and require a success status.
///
/// Error bodies are logged at debug level only.
pub async fn send_checked(
    transport: &dyn HttpTransport,
    provider: &str,
    request: HttpRequest,
) -> Result<HttpResponse, ProviderError> {
    let response = transport.send(request).await?;
    check_status(provider, response)
}

/// Require a success status, logging the error body at debug level.
pub fn check_status(provider: &str, response: HttpResponse) -> Result<HttpResponse, ProviderError> {
    if !response.is_success() {
        debug!(provider, status = response.status, body = %response.text(), "Provider error body");
    }
    response.error_for_status()
}
