//! Chat endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chat_core::Message;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub transaction_id: Option<String>,
}

/// Answer a conversation with the configured dispatch strategy.
pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(request) = payload?;
    let reply = state.orchestrator.handle(&request.messages).await?;

    Ok(Json(ChatResponse {
        reply: reply.reply,
        transaction_id: reply.transaction_id,
    }))
}
