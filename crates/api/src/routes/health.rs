//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use orchestrator::PersistenceGateway;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub message: String,
    pub db_status: &'static str,
    pub dns_optimization: String,
    pub strategy: &'static str,
    pub available_apis: Vec<String>,
}

/// Report store reachability, resolver mode and eligible providers.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let db_status = state.orchestrator.store().status().await;

    let message = if state.available_apis.is_empty() {
        "No provider credentials configured; answering locally.".to_string()
    } else {
        format!("{} provider(s) ready.", state.available_apis.len())
    };

    Json(Health {
        status: "ok",
        message,
        db_status: db_status.as_str(),
        dns_optimization: state.dns_mode.to_string(),
        strategy: state.orchestrator.strategy().as_str(),
        available_apis: state.available_apis.as_ref().clone(),
    })
}
