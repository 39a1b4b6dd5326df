//! Turning per-provider results into one reply.

use std::str::FromStr;

use chat_core::ProviderResult;

use crate::error::{OrchestratorError, UnknownOption};

/// Separator between replies in [`SelectionMode::ConcatenateAll`].
pub const CONCAT_SEPARATOR: &str = "\n\n";

/// How results from a parallel dispatch are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// First success in priority order.
    #[default]
    SelectFirst,
    /// Every result side by side, failures as tagged placeholders.
    ConcatenateAll,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::SelectFirst => "first",
            SelectionMode::ConcatenateAll => "concatenate",
        }
    }

    /// Apply this mode to results held in priority order.
    pub fn select(&self, results: &[ProviderResult]) -> Result<String, OrchestratorError> {
        match self {
            SelectionMode::SelectFirst => select_first(results),
            SelectionMode::ConcatenateAll => concatenate_all(results),
        }
    }
}

impl FromStr for SelectionMode {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "select_first" | "" => Ok(SelectionMode::SelectFirst),
            "concatenate" | "concat" | "all" => Ok(SelectionMode::ConcatenateAll),
            other => Err(UnknownOption {
                kind: "selection mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Text of the first success, scanning in priority order.
///
/// Completion order plays no part. With no success the request fails as
/// exhausted rather than returning a placeholder.
pub fn select_first(results: &[ProviderResult]) -> Result<String, OrchestratorError> {
    results
        .iter()
        .find_map(|result| result.text().map(str::to_string))
        .ok_or_else(|| exhausted(results))
}

/// Every result joined by a blank line.
///
/// Failures contribute their tagged placeholder. If nothing succeeded the
/// request still fails as exhausted.
pub fn concatenate_all(results: &[ProviderResult]) -> Result<String, OrchestratorError> {
    if !results.iter().any(ProviderResult::is_success) {
        return Err(exhausted(results));
    }

    Ok(results
        .iter()
        .map(ProviderResult::display_text)
        .collect::<Vec<_>>()
        .join(CONCAT_SEPARATOR))
}

fn exhausted(results: &[ProviderResult]) -> OrchestratorError {
    OrchestratorError::AllProvidersExhausted {
        last_error: results.iter().rev().find_map(|r| r.error().cloned()),
    }
}
