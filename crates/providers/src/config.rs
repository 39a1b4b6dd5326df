//! Static provider configuration.
//!
//! Each provider is described once at startup by a [`ProviderConfig`]. Values
//! come from built-in defaults, overridden by environment variables using the
//! provider's prefix:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `{PREFIX}_API_KEY` | Credential |
//! | `{PREFIX}_API_URL` | Endpoint (base URL for model-in-path shapes) |
//! | `{PREFIX}_MODEL` | Single model |
//! | `{PREFIX}_MODELS` | Comma-separated rotation set (takes precedence) |
//! | `{PREFIX}_TIMEOUT_SECS` | Per-call timeout |
//! | `{PREFIX}_TEMPERATURE` | Sampling temperature |
//! | `{PREFIX}_MAX_TOKENS` | Completion token cap |

use std::env;
use std::time::Duration;

use chat_core::{PromptStyle, RetryPolicy};
use thiserror::Error;

/// Built-in provider ids in default priority order.
pub const DEFAULT_PROVIDER_ORDER: &[&str] = &[
    "groq",
    "anthropic",
    "openrouter",
    "together",
    "xai",
    "huggingface",
    "replicate",
];

/// Version header value sent to the Anthropic messages API.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default system prompt for providers that require one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, analytical assistant.";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown provider id: {0}")]
    UnknownProvider(String),

    #[error("provider {0} has no model configured")]
    NoModel(String),
}

/// Wire format a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// OpenAI-style `{model, messages, temperature, max_tokens}`.
    ChatCompletion,
    /// Anthropic messages API with a top-level `system` field.
    AnthropicMessages,
    /// Single flattened prompt, `generated_text` back.
    TextGeneration(PromptStyle),
    /// Submit a prediction job, then poll for its result.
    Prediction(PromptStyle),
}

/// How the credential is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// Vendor-specific header carrying the raw key.
    Header(String),
}

/// Polling bounds for prediction providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before each status check.
    pub interval: Duration,
    /// Status checks before giving up.
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_polls: 15,
        }
    }
}

/// Whether a provider may be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// No credential configured.
    CredentialMissing,
    /// The credential is a template value such as `your_groq_api_key_here`.
    PlaceholderCredential,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Configuration for one provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Stable id (`groq`, `anthropic`, ...).
    pub id: String,
    /// Name shown in health output.
    pub display_name: String,
    /// Tag prepended to replies.
    pub marker: String,
    /// Wire format.
    pub shape: RequestShape,
    /// Endpoint URL, or base URL when the model is part of the path.
    pub api_url: String,
    /// Credential value, if set.
    pub api_key: Option<String>,
    /// Whether dispatch requires a credential.
    pub credential_required: bool,
    /// How the credential is sent.
    pub auth: AuthScheme,
    /// Model, or interchangeable models to rotate through.
    pub models: Vec<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token cap, if the provider takes one.
    pub max_tokens: Option<u32>,
    /// Nucleus sampling, if the provider takes it.
    pub top_p: Option<f32>,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Extra headers (attribution, API versions).
    pub extra_headers: Vec<(String, String)>,
    /// Retry bounds for the "model loading" signal.
    pub retry: RetryPolicy,
    /// Poll bounds for prediction providers.
    pub poll: PollPolicy,
}

impl ProviderConfig {
    fn base(id: &str, display_name: &str, marker: &str, shape: RequestShape, api_url: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            marker: marker.to_string(),
            shape,
            api_url: api_url.to_string(),
            api_key: None,
            credential_required: true,
            auth: AuthScheme::Bearer,
            models: Vec::new(),
            temperature: 0.7,
            max_tokens: Some(2048),
            top_p: None,
            timeout: Duration::from_secs(30),
            extra_headers: Vec::new(),
            retry: RetryPolicy::none(),
            poll: PollPolicy::default(),
        }
    }

    /// Built-in defaults for a known provider id.
    pub fn builtin(id: &str) -> Option<Self> {
        let config = match id {
            "groq" => Self {
                models: vec!["llama-3.1-70b-versatile".to_string()],
                temperature: 0.8,
                ..Self::base(
                    "groq",
                    "Groq",
                    "🔥 ",
                    RequestShape::ChatCompletion,
                    "https://api.groq.com/openai/v1/chat/completions",
                )
            },
            "anthropic" => Self {
                auth: AuthScheme::Header("x-api-key".to_string()),
                models: vec!["claude-3-5-sonnet-20241022".to_string()],
                extra_headers: vec![(
                    "anthropic-version".to_string(),
                    ANTHROPIC_VERSION.to_string(),
                )],
                ..Self::base(
                    "anthropic",
                    "Claude",
                    "🔥 [Claude 3.5 Sonnet]: ",
                    RequestShape::AnthropicMessages,
                    "https://api.anthropic.com/v1/messages",
                )
            },
            "openrouter" => Self {
                models: vec!["meta-llama/llama-3.1-70b-instruct".to_string()],
                temperature: 1.2,
                max_tokens: None,
                timeout: Duration::from_secs(45),
                extra_headers: vec![
                    ("HTTP-Referer".to_string(), "http://localhost:8001".to_string()),
                    ("X-Title".to_string(), "Multi-provider chat".to_string()),
                ],
                ..Self::base(
                    "openrouter",
                    "OpenRouter",
                    "🐬 [Llama 3.1 70B]: ",
                    RequestShape::ChatCompletion,
                    "https://openrouter.ai/api/v1/chat/completions",
                )
            },
            "together" => Self {
                models: vec!["mistralai/Mistral-7B-Instruct-v0.2".to_string()],
                temperature: 1.0,
                ..Self::base(
                    "together",
                    "Together.ai",
                    "🐺 ",
                    RequestShape::ChatCompletion,
                    "https://api.together.xyz/v1/chat/completions",
                )
            },
            "xai" => Self {
                models: vec!["grok-beta".to_string()],
                ..Self::base(
                    "xai",
                    "Grok",
                    "⚡ ",
                    RequestShape::ChatCompletion,
                    "https://api.x.ai/v1/chat/completions",
                )
            },
            "huggingface" => Self {
                models: vec![
                    "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
                    "HuggingFaceH4/zephyr-7b-beta".to_string(),
                ],
                temperature: 0.9,
                max_tokens: Some(1024),
                top_p: Some(0.95),
                retry: RetryPolicy::default(),
                ..Self::base(
                    "huggingface",
                    "Hugging Face",
                    "🤗 ",
                    RequestShape::TextGeneration(PromptStyle::ChatTokens),
                    "https://api-inference.huggingface.co/models",
                )
            },
            "replicate" => Self {
                models: vec!["meta/meta-llama-3-70b-instruct".to_string()],
                temperature: 0.75,
                max_tokens: Some(1024),
                timeout: Duration::from_secs(60),
                ..Self::base(
                    "replicate",
                    "Replicate",
                    "🦙 ",
                    RequestShape::Prediction(PromptStyle::Bracketed),
                    "https://api.replicate.com/v1/models",
                )
            },
            _ => return None,
        };
        Some(config)
    }

    /// Environment variable prefix for this provider.
    pub fn env_prefix(&self) -> String {
        self.id.to_ascii_uppercase()
    }

    /// The template value shipped in example `.env` files.
    pub fn placeholder(&self) -> String {
        format!("your_{}_api_key_here", self.id)
    }

    /// Load a built-in provider with overrides from the process environment.
    pub fn from_env(id: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(id, |key| env::var(key).ok())
    }

    /// Load a built-in provider with overrides from `lookup`.
    ///
    /// Variables are `{PREFIX}_{SUFFIX}`, where the prefix is the upper-cased id:
    ///
    /// | Suffix | Effect |
    /// |--------|--------|
    /// | `API_KEY` | Credential |
    /// | `API_URL` | Endpoint, trailing `/` removed |
    /// | `MODELS` / `MODEL` | Comma list of models, or a single model |
    /// | `TIMEOUT_SECS` | Per-call timeout |
    /// | `TEMPERATURE` | Sampling temperature |
    /// | `MAX_TOKENS` | Output token cap |
    /// | `REFERER` / `TITLE` | Attribution headers, where the provider sends them |
    pub fn from_lookup<F>(id: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config =
            Self::builtin(id).ok_or_else(|| ConfigError::UnknownProvider(id.to_string()))?;
        let prefix = config.env_prefix();
        let var = |suffix: &str| lookup(&format!("{prefix}_{suffix}"));

        config.api_key = var("API_KEY").map(|key| key.trim().to_string());

        if let Some(url) = var("API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(models) = var("MODELS") {
            config.models = split_list(&models);
        } else if let Some(model) = var("MODEL") {
            config.models = vec![model.trim().to_string()];
        }

        if let Some(secs) = var("TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(temperature) = var("TEMPERATURE").and_then(|v| v.parse().ok()) {
            config.temperature = temperature;
        }

        if let Some(max_tokens) = var("MAX_TOKENS").and_then(|v| v.parse().ok()) {
            config.max_tokens = Some(max_tokens);
        }

        // Attribution headers are only overridden where the provider sends them.
        for (suffix, header) in [("REFERER", "HTTP-Referer"), ("TITLE", "X-Title")] {
            if let Some(value) = var(suffix) {
                for (name, current) in config.extra_headers.iter_mut() {
                    if name == header {
                        *current = value.trim().to_string();
                    }
                }
            }
        }

        if config.models.is_empty() {
            return Err(ConfigError::NoModel(config.id));
        }

        Ok(config)
    }

    /// Credential check, evaluated once at startup.
    pub fn eligibility(&self) -> Eligibility {
        if !self.credential_required {
            return Eligibility::Eligible;
        }

        match self.api_key.as_deref() {
            None | Some("") => Eligibility::CredentialMissing,
            Some(key) if is_placeholder(key, &self.placeholder()) => {
                Eligibility::PlaceholderCredential
            }
            Some(_) => Eligibility::Eligible,
        }
    }

    /// Authentication plus extra headers for a request.
    pub fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(self.extra_headers.len() + 1);
        if let Some(key) = &self.api_key {
            match &self.auth {
                AuthScheme::Bearer => {
                    headers.push(("Authorization".to_string(), format!("Bearer {key}")))
                }
                AuthScheme::Header(name) => headers.push((name.clone(), key.clone())),
            }
        }
        headers.extend(self.extra_headers.iter().cloned());
        headers
    }
}

/// Provider ids in priority order, from `CHAT_PROVIDERS` or the default order.
pub fn provider_order<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("CHAT_PROVIDERS") {
        Some(list) if !list.trim().is_empty() => split_list(&list)
            .into_iter()
            .map(|id| id.to_ascii_lowercase())
            .collect(),
        _ => DEFAULT_PROVIDER_ORDER.iter().map(|id| id.to_string()).collect(),
    }
}

/// Load every configured provider from `lookup`, in priority order.
pub fn load_configs<F>(lookup: F) -> Result<Vec<ProviderConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    provider_order(&lookup)
        .iter()
        .map(|id| ProviderConfig::from_lookup(id, &lookup))
        .collect()
}

fn is_placeholder(value: &str, sentinel: &str) -> bool {
    value == sentinel || (value.starts_with("your_") && value.ends_with("_here"))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_builtin_known_ids() {
        for id in DEFAULT_PROVIDER_ORDER {
            let config = ProviderConfig::builtin(id).unwrap();
            assert_eq!(config.id, *id);
            assert!(!config.models.is_empty());
        }
        assert!(ProviderConfig::builtin("nope").is_none());
    }

    #[test]
    fn test_missing_credential() {
        let config = ProviderConfig::from_lookup("groq", lookup(&[])).unwrap();
        assert_eq!(config.eligibility(), Eligibility::CredentialMissing);

        let config = ProviderConfig::from_lookup("groq", lookup(&[("GROQ_API_KEY", "  ")])).unwrap();
        assert_eq!(config.eligibility(), Eligibility::CredentialMissing);
    }

    #[test]
    fn test_placeholder_credential() {
        let config = ProviderConfig::from_lookup(
            "groq",
            lookup(&[("GROQ_API_KEY", "your_groq_api_key_here")]),
        )
        .unwrap();
        assert_eq!(config.eligibility(), Eligibility::PlaceholderCredential);

        let config = ProviderConfig::from_lookup(
            "together",
            lookup(&[("TOGETHER_API_KEY", "your_together_key_here")]),
        )
        .unwrap();
        assert_eq!(config.eligibility(), Eligibility::PlaceholderCredential);
    }

    #[test]
    fn test_overrides_applied() {
        let config = ProviderConfig::from_lookup(
            "huggingface",
            lookup(&[
                ("HUGGINGFACE_API_KEY", "hf_real"),
                ("HUGGINGFACE_MODELS", "a/one, b/two ,"),
                ("HUGGINGFACE_TIMEOUT_SECS", "12"),
                ("HUGGINGFACE_API_URL", "http://localhost:9000/models/"),
            ]),
        )
        .unwrap();

        assert_eq!(config.eligibility(), Eligibility::Eligible);
        assert_eq!(config.models, vec!["a/one", "b/two"]);
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.api_url, "http://localhost:9000/models");
    }

    #[test]
    fn test_request_headers() {
        let config = ProviderConfig::from_lookup(
            "anthropic",
            lookup(&[("ANTHROPIC_API_KEY", "sk-ant")]),
        )
        .unwrap();
        let headers = config.request_headers();
        assert!(headers.contains(&("x-api-key".to_string(), "sk-ant".to_string())));
        assert!(headers.contains(&("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string())));

        let config =
            ProviderConfig::from_lookup("openrouter", lookup(&[("OPENROUTER_API_KEY", "sk-or")]))
                .unwrap();
        let headers = config.request_headers();
        assert_eq!(headers[0], ("Authorization".to_string(), "Bearer sk-or".to_string()));
        assert!(headers.iter().any(|(name, _)| name == "HTTP-Referer"));
        assert!(headers.iter().any(|(name, _)| name == "X-Title"));
    }

    #[test]
    fn test_attribution_override() {
        let config = ProviderConfig::from_lookup(
            "openrouter",
            lookup(&[("OPENROUTER_TITLE", "My App"), ("GROQ_TITLE", "ignored")]),
        )
        .unwrap();
        assert!(config
            .extra_headers
            .contains(&("X-Title".to_string(), "My App".to_string())));

        let groq = ProviderConfig::from_lookup("groq", lookup(&[("GROQ_TITLE", "x")])).unwrap();
        assert!(groq.extra_headers.is_empty());
    }

    #[test]
    fn test_credential_whitespace_trimmed() {
        let config =
            ProviderConfig::from_lookup("groq", lookup(&[("GROQ_API_KEY", "  gsk-real \n")]))
                .unwrap();
        assert_eq!(config.eligibility(), Eligibility::Eligible);
        assert!(config
            .request_headers()
            .contains(&("Authorization".to_string(), "Bearer gsk-real".to_string())));

        let anthropic =
            ProviderConfig::from_lookup("anthropic", lookup(&[("ANTHROPIC_API_KEY", "sk-ant ")]))
                .unwrap();
        assert!(anthropic
            .request_headers()
            .contains(&("x-api-key".to_string(), "sk-ant".to_string())));
    }

    #[test]
    fn test_provider_order() {
        assert_eq!(provider_order(lookup(&[])).len(), DEFAULT_PROVIDER_ORDER.len());
        assert_eq!(
            provider_order(lookup(&[("CHAT_PROVIDERS", "Together, groq")])),
            vec!["together", "groq"]
        );
    }

    #[test]
    fn test_load_configs_rejects_unknown() {
        let result = load_configs(lookup(&[("CHAT_PROVIDERS", "groq,bogus")]));
        assert!(matches!(result, Err(ConfigError::UnknownProvider(id)) if id == "bogus"));
    }
}
