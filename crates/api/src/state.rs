//! Application state shared across handlers.

use std::sync::Arc;

use orchestrator::Orchestrator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Dispatch engine, built once at startup.
    pub orchestrator: Arc<Orchestrator>,
    /// Display names of the eligible providers, in priority order.
    pub available_apis: Arc<Vec<String>>,
    /// Resolver description for health output.
    pub dns_mode: Arc<str>,
}

impl AppState {
    /// Create new application state.
    pub fn new(orchestrator: Orchestrator, available_apis: Vec<String>, dns_mode: &str) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            available_apis: Arc::new(available_apis),
            dns_mode: Arc::from(dns_mode),
        }
    }
}
