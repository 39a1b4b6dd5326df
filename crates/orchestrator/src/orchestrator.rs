//! The dispatch engine.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chat_core::{
    format_conversation, FormattedConversation, Message, Outcome, Provider, ProviderResult,
};
use futures::future::join_all;
use futures::FutureExt;
use tracing::{error, info, warn};

use crate::error::OrchestratorError;
use crate::local::LocalResponder;
use crate::persistence::{NoopStore, PersistenceGateway};
use crate::selector::SelectionMode;
use crate::strategy::DispatchStrategy;

/// Default overall deadline for one request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(50);

/// The reply to one chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Final reply text.
    pub reply: String,
    /// Id of the stored transaction, when the store accepted it.
    pub transaction_id: Option<String>,
}

/// Answers chat requests by dispatching to providers.
///
/// One engine covers every strategy:
/// - `ParallelAll` calls every provider at once and combines the results in
///   priority order with the configured [`SelectionMode`]
/// - `SequentialFallback` walks the providers in priority order and stops at
///   the first success
/// - `LocalOnly` answers from the [`LocalResponder`] without network calls
///
/// Network strategies run under an overall deadline. When it fires, every
/// in-flight provider call is dropped.
pub struct Orchestrator {
    strategy: DispatchStrategy,
    selection: SelectionMode,
    /// Eligible providers in priority order.
    providers: Vec<Arc<dyn Provider>>,
    local: LocalResponder,
    store: Arc<dyn PersistenceGateway>,
    request_timeout: Duration,
}

impl Orchestrator {
    /// Create an orchestrator with no persistence, `SelectFirst` selection and
    /// the default deadline.
    pub fn new(strategy: DispatchStrategy, providers: Vec<Arc<dyn Provider>>) -> Self {
        Self {
            strategy,
            selection: SelectionMode::default(),
            providers,
            local: LocalResponder::default(),
            store: Arc::new(NoopStore),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set how parallel results are combined.
    pub fn with_selection(mut self, selection: SelectionMode) -> Self {
        self.selection = selection;
        self
    }

    /// Set the transaction store.
    pub fn with_store(mut self, store: Arc<dyn PersistenceGateway>) -> Self {
        self.store = store;
        self
    }

    /// Set the overall deadline for network strategies.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Replace the local responder.
    pub fn with_local_responder(mut self, local: LocalResponder) -> Self {
        self.local = local;
        self
    }

    pub fn strategy(&self) -> DispatchStrategy {
        self.strategy
    }

    pub fn selection(&self) -> SelectionMode {
        self.selection
    }

    pub fn store(&self) -> &Arc<dyn PersistenceGateway> {
        &self.store
    }

    /// Names of the providers this engine dispatches to, in priority order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Answer a conversation and record it.
    ///
    /// Persistence is best-effort: a store failure only leaves
    /// `transaction_id` empty.
    pub async fn handle(&self, messages: &[Message]) -> Result<ChatReply, OrchestratorError> {
        let conversation = format_conversation(messages);
        info!(
            strategy = %self.strategy,
            turns = conversation.messages.len(),
            "Handling chat request"
        );

        let reply = self.dispatch(&conversation).await?;
        let transaction_id = self.store.save(messages, &reply).await;

        Ok(ChatReply {
            reply,
            transaction_id,
        })
    }

    /// Produce reply text for a formatted conversation.
    pub async fn dispatch(
        &self,
        conversation: &FormattedConversation,
    ) -> Result<String, OrchestratorError> {
        if self.strategy == DispatchStrategy::LocalOnly {
            return Ok(self.local.respond(conversation));
        }

        if conversation.is_empty() {
            return Err(OrchestratorError::EmptyConversation);
        }

        if self.providers.is_empty() {
            warn!("No eligible providers configured");
            return Err(OrchestratorError::AllProvidersExhausted { last_error: None });
        }

        let dispatch = async {
            match self.strategy {
                DispatchStrategy::SequentialFallback => self.dispatch_sequential(conversation).await,
                _ => self.dispatch_parallel(conversation).await,
            }
        };

        // A panicking adapter fails the request instead of the task.
        let dispatch = AssertUnwindSafe(dispatch).catch_unwind();

        match tokio::time::timeout(self.request_timeout, dispatch).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => {
                let message = panic_message(panic.as_ref());
                error!("Provider dispatch panicked: {}", message);
                Err(OrchestratorError::Internal(message))
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.request_timeout.as_secs_f32(),
                    "Request deadline elapsed, in-flight provider calls dropped"
                );
                Err(OrchestratorError::RequestTimeout)
            }
        }
    }

    async fn dispatch_parallel(
        &self,
        conversation: &FormattedConversation,
    ) -> Result<String, OrchestratorError> {
        // join_all keeps input order, so results stay in priority order.
        let results = join_all(self.providers.iter().map(|p| p.execute(conversation))).await;
        for result in &results {
            log_result(result);
        }
        self.selection.select(&results)
    }

    async fn dispatch_sequential(
        &self,
        conversation: &FormattedConversation,
    ) -> Result<String, OrchestratorError> {
        let mut last_error = None;

        for provider in &self.providers {
            let result = provider.execute(conversation).await;
            log_result(&result);
            match result.outcome {
                Outcome::Success(text) => return Ok(text),
                Outcome::Failure(err) => last_error = Some(err),
            }
        }

        Err(OrchestratorError::AllProvidersExhausted { last_error })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn log_result(result: &ProviderResult) {
    let latency_ms = result.latency.as_millis() as u64;
    match &result.outcome {
        Outcome::Success(_) => {
            info!(provider = %result.provider, latency_ms, "Provider succeeded");
        }
        Outcome::Failure(err) => {
            warn!(provider = %result.provider, latency_ms, kind = err.kind(), "Provider failed: {}", err);
        }
    }
}
