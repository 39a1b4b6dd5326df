//! Error types for orchestrator operations.

use chat_core::ProviderError;
use thiserror::Error;

/// Errors that can end a dispatch.
///
/// Display text is safe to show to callers: provider error bodies are never
/// part of it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    /// No non-system messages to answer.
    #[error("conversation is empty")]
    EmptyConversation,

    /// No provider produced a reply.
    #[error("all providers exhausted")]
    AllProvidersExhausted {
        /// The most recent provider failure, if any provider was tried.
        last_error: Option<ProviderError>,
    },

    /// The overall request deadline elapsed.
    #[error("request timed out")]
    RequestTimeout,

    /// Anything unexpected.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A configuration value that names no known option.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}
