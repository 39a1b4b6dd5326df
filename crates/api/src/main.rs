//! HTTP server for the multi-provider chat service.
//!
//! Loads provider credentials from the environment, picks a dispatch
//! strategy, and serves `POST /chat`, `GET /health` and `GET /` both at the
//! root and under `/api`.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use axum::http::HeaderValue;
use database::Database;
use orchestrator::{NoopStore, Orchestrator, PersistenceGateway};
use providers::{ProviderRegistry, ReqwestTransport};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, CorsOrigins};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting chat server");

    // Providers
    let transport = Arc::new(ReqwestTransport::new(&config.transport)?);
    let registry = ProviderRegistry::from_env(transport, config.rotation.picker())?;
    let strategy = config.strategy.resolve(registry.eligible().len());
    info!(
        %strategy,
        selection = config.selection.as_str(),
        providers = ?registry.eligible_names(),
        "Dispatch strategy selected"
    );

    // Transaction store
    let db = if config.persistence_enabled {
        connect_store(&config.database_url).await
    } else {
        info!("Persistence disabled");
        None
    };
    let store: Arc<dyn PersistenceGateway> = match &db {
        Some(db) => Arc::new(db.clone()),
        None => Arc::new(NoopStore),
    };

    // Build application state
    let orchestrator = Orchestrator::new(strategy, registry.eligible().to_vec())
        .with_selection(config.selection)
        .with_store(store)
        .with_request_timeout(config.request_timeout);
    let state = AppState::new(
        orchestrator,
        registry.eligible_names(),
        &config.transport.resolver.describe(),
    );

    // Build router
    let app = routes::router()
        .layer(cors_layer(&config.cors_origins))
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "Chat server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
        info!("Database connection closed");
    }

    Ok(())
}

/// Connect and migrate, falling back to no persistence on failure.
async fn connect_store(url: &str) -> Option<Database> {
    let db = match Database::connect(url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database, continuing without persistence: {}", e);
            return None;
        }
    };

    match db.migrate().await {
        Ok(()) => Some(db),
        Err(e) => {
            error!("Failed to migrate database, continuing without persistence: {}", e);
            db.close().await;
            None
        }
    }
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(%origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
