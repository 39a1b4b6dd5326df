//! Dispatch engine for multi-provider chat completion.
//!
//! This crate provides the [`Orchestrator`] type, which turns a chat
//! conversation into one reply by calling the eligible providers under a
//! [`DispatchStrategy`], combining their results with a [`SelectionMode`],
//! and recording the answered conversation through a [`PersistenceGateway`].
//!
//! # Architecture
//!
//! ```text
//! messages
//!    ↓
//! format_conversation (system prompt split off, user-first guaranteed)
//!    ↓
//! ┌──────────────────────── ORCHESTRATOR ────────────────────────┐
//! │  ParallelAll         → every provider at once → selection     │
//! │  SequentialFallback  → one at a time, stop at first success   │
//! │  LocalOnly           → keyword rule engine, no network        │
//! │  (network strategies run under one overall deadline)          │
//! └───────────────────────────────────────────────────────────────┘
//!    ↓
//! PersistenceGateway::save (best-effort)
//!    ↓
//! ChatReply { reply, transaction_id }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orchestrator::{DispatchStrategy, Orchestrator, SelectionMode};
//!
//! let orchestrator = Orchestrator::new(DispatchStrategy::ParallelAll, registry.eligible().to_vec())
//!     .with_selection(SelectionMode::SelectFirst)
//!     .with_store(Arc::new(database));
//!
//! let reply = orchestrator.handle(&messages).await?;
//! println!("{} ({:?})", reply.reply, reply.transaction_id);
//! ```

mod error;
mod local;
mod orchestrator;
mod persistence;
mod selector;
mod strategy;

pub use error::{OrchestratorError, UnknownOption};
pub use local::{Category, LocalResponder, FALLBACK_APOLOGY};
pub use orchestrator::{ChatReply, Orchestrator, DEFAULT_REQUEST_TIMEOUT};
pub use persistence::{NoopStore, PersistenceGateway, StoreStatus};
pub use selector::{concatenate_all, select_first, SelectionMode, CONCAT_SEPARATOR};
pub use strategy::{DispatchStrategy, StrategyChoice};
