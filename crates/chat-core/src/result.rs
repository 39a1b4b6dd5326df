//! Per-call provider outcomes.

use std::time::Duration;

use crate::error::ProviderError;

/// What a provider call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Tagged reply text.
    Success(String),
    /// The call failed.
    Failure(ProviderError),
}

/// Result of one provider call, owned by the dispatcher for one request.
#[derive(Debug, Clone)]
pub struct ProviderResult {
    /// Provider that produced this result.
    pub provider: String,
    /// Marker the provider tags its text with.
    pub marker: String,
    /// Success text or failure.
    pub outcome: Outcome,
    /// Wall-clock time spent on the call.
    pub latency: Duration,
}

impl ProviderResult {
    /// Build a successful result.
    pub fn success(
        provider: impl Into<String>,
        marker: impl Into<String>,
        text: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            provider: provider.into(),
            marker: marker.into(),
            outcome: Outcome::Success(text.into()),
            latency,
        }
    }

    /// Build a failed result.
    pub fn failure(
        provider: impl Into<String>,
        marker: impl Into<String>,
        error: ProviderError,
        latency: Duration,
    ) -> Self {
        Self {
            provider: provider.into(),
            marker: marker.into(),
            outcome: Outcome::Failure(error),
            latency,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// Reply text, if the call succeeded.
    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(text) => Some(text),
            Outcome::Failure(_) => None,
        }
    }

    /// The failure, if the call failed.
    pub fn error(&self) -> Option<&ProviderError> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(err) => Some(err),
        }
    }

    /// Text shown for this result when all results are displayed together.
    ///
    /// Failures render as a tagged placeholder that never carries provider
    /// error detail.
    pub fn display_text(&self) -> String {
        match &self.outcome {
            Outcome::Success(text) => text.clone(),
            Outcome::Failure(_) => format!("{}[{} unavailable]", self.marker, self.provider),
        }
    }
}
