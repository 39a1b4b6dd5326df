//! HTTP adapters for chat completion providers.
//!
//! Each adapter implements [`chat_core::Provider`] for one request shape:
//!
//! - [`ChatCompletionProvider`]: OpenAI-style `{model, messages}` endpoints
//! - [`AnthropicProvider`]: the Anthropic messages API
//! - [`TextGenerationProvider`]: single flattened prompt, with model rotation
//!   and a bounded "model loading" retry
//! - [`PredictionProvider`]: submit a job, then poll for its result
//!
//! Adapters never talk to the network directly. They go through an
//! [`HttpTransport`], normally a [`ReqwestTransport`] that caps in-flight
//! requests per host and caches hostname lookups.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chat_core::RandomPicker;
//! use providers::{ProviderRegistry, ReqwestTransport, TransportSettings};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(ReqwestTransport::new(&TransportSettings::default())?);
//! let registry = ProviderRegistry::from_env(transport, Arc::new(RandomPicker))?;
//! println!("{} providers ready", registry.eligible().len());
//! # Ok(())
//! # }
//! ```

mod anthropic;
mod api_types;
mod chat_completion;
mod config;
mod http;
mod prediction;
mod registry;
mod reqwest_transport;
mod resolver;
mod text_generation;

pub use anthropic::AnthropicProvider;
pub use chat_completion::ChatCompletionProvider;
pub use config::{
    load_configs, provider_order, AuthScheme, ConfigError, Eligibility, PollPolicy,
    ProviderConfig, RequestShape, ANTHROPIC_VERSION, DEFAULT_PROVIDER_ORDER,
    DEFAULT_SYSTEM_PROMPT,
};
pub use http::{
    check_status, send_checked, DynHttpTransport, HttpMethod, HttpRequest, HttpResponse,
    HttpTransport, TransportError,
};
pub use prediction::PredictionProvider;
pub use registry::{build_provider, ProviderRegistry, RegistryEntry};
pub use reqwest_transport::{ReqwestTransport, TransportSettings};
pub use resolver::{CachingResolver, ResolverMode};
pub use text_generation::TextGenerationProvider;
