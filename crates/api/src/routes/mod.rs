//! Route handlers for the chat API.

pub mod chat;
pub mod health;
pub mod root;

use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::panic_response;
use crate::state::AppState;

/// Build the router with all routes.
///
/// Every route is served at the root and again under `/api`. A panic in a
/// handler becomes a 500 with the usual error body.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(routes())
        .nest("/api", routes())
        .layer(CatchPanicLayer::custom(panic_response))
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root::root))
        .route("/chat", post(chat::chat))
        .route("/health", get(health::health))
}
