//! Static provider registry.
//!
//! Credentials are checked once when the registry is built. Providers without
//! a usable credential are logged and excluded; the remaining ones keep their
//! configured priority order.

use std::env;
use std::sync::Arc;

use chat_core::{ModelPicker, Provider};
use tracing::{info, warn};

use crate::anthropic::AnthropicProvider;
use crate::chat_completion::ChatCompletionProvider;
use crate::config::{load_configs, ConfigError, Eligibility, ProviderConfig, RequestShape};
use crate::http::DynHttpTransport;
use crate::prediction::PredictionProvider;
use crate::text_generation::TextGenerationProvider;

/// Build the adapter matching a configuration's request shape.
pub fn build_provider(
    config: ProviderConfig,
    transport: DynHttpTransport,
    picker: Arc<dyn ModelPicker>,
) -> Arc<dyn Provider> {
    match config.shape {
        RequestShape::ChatCompletion => {
            Arc::new(ChatCompletionProvider::new(config, transport, picker))
        }
        RequestShape::AnthropicMessages => {
            Arc::new(AnthropicProvider::new(config, transport, picker))
        }
        RequestShape::TextGeneration(style) => {
            Arc::new(TextGenerationProvider::new(config, style, transport, picker))
        }
        RequestShape::Prediction(style) => {
            Arc::new(PredictionProvider::new(config, style, transport, picker))
        }
    }
}

/// A configured provider and whether it passed the credential check.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub config: ProviderConfig,
    pub eligibility: Eligibility,
}

/// Every configured provider, with the eligible ones built and ready.
pub struct ProviderRegistry {
    entries: Vec<RegistryEntry>,
    eligible: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Check credentials and build adapters for the eligible providers.
    pub fn new(
        configs: Vec<ProviderConfig>,
        transport: DynHttpTransport,
        picker: Arc<dyn ModelPicker>,
    ) -> Self {
        let mut entries = Vec::with_capacity(configs.len());
        let mut eligible = Vec::new();

        for config in configs {
            let eligibility = config.eligibility();
            match eligibility {
                Eligibility::Eligible => {
                    info!(provider = %config.id, models = ?config.models, "Provider enabled");
                    eligible.push(build_provider(config.clone(), transport.clone(), picker.clone()));
                }
                Eligibility::CredentialMissing => {
                    warn!(provider = %config.id, "Provider disabled: credential missing");
                }
                Eligibility::PlaceholderCredential => {
                    warn!(provider = %config.id, "Provider disabled: placeholder credential");
                }
            }
            entries.push(RegistryEntry {
                config,
                eligibility,
            });
        }

        info!(
            eligible = eligible.len(),
            configured = entries.len(),
            "Provider registry ready"
        );

        Self { entries, eligible }
    }

    /// Load configurations from the process environment.
    ///
    /// See [`ProviderConfig::from_lookup`] for the variables read per provider.
    pub fn from_env(
        transport: DynHttpTransport,
        picker: Arc<dyn ModelPicker>,
    ) -> Result<Self, ConfigError> {
        let configs = load_configs(|key| env::var(key).ok())?;
        Ok(Self::new(configs, transport, picker))
    }

    /// Eligible providers in priority order.
    pub fn eligible(&self) -> &[Arc<dyn Provider>] {
        &self.eligible
    }

    /// Every configured provider, eligible or not.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Display names of the eligible providers, in priority order.
    pub fn eligible_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.eligibility.is_eligible())
            .map(|entry| entry.config.display_name.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::ScriptedTransport;
    use chat_core::RandomPicker;

    fn configs(keys: &[(&str, Option<&str>)]) -> Vec<ProviderConfig> {
        keys.iter()
            .map(|(id, key)| ProviderConfig {
                api_key: key.map(str::to_string),
                ..ProviderConfig::builtin(id).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_ineligible_providers_excluded_in_order() {
        let registry = ProviderRegistry::new(
            configs(&[
                ("groq", Some("gsk-real")),
                ("anthropic", None),
                ("together", Some("your_together_api_key_here")),
                ("replicate", Some("r8_real")),
            ]),
            ScriptedTransport::new(),
            Arc::new(RandomPicker),
        );

        let names: Vec<&str> = registry.eligible().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["groq", "replicate"]);
        assert_eq!(registry.eligible_names(), vec!["Groq", "Replicate"]);
        assert_eq!(registry.entries().len(), 4);
        assert_eq!(
            registry.entries()[2].eligibility,
            Eligibility::PlaceholderCredential
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::new(
            configs(&[("groq", None)]),
            ScriptedTransport::new(),
            Arc::new(RandomPicker),
        );
        assert!(registry.is_empty());
        assert!(registry.eligible_names().is_empty());
    }

    #[test]
    fn test_markers_follow_config() {
        let registry = ProviderRegistry::new(
            configs(&[("openrouter", Some("sk-or"))]),
            ScriptedTransport::new(),
            Arc::new(RandomPicker),
        );
        assert_eq!(registry.eligible()[0].marker(), "🐬 [Llama 3.1 70B]: ");
    }

    #[tokio::test]
    async fn test_env_model_list_rotates_for_chat_completion() {
        use chat_core::{format_conversation, Message, RoundRobinPicker};
        use serde_json::json;

        let transport = ScriptedTransport::new();
        for _ in 0..6 {
            transport.push_json(200, json!({"choices": [{"message": {"content": "ok"}}]}));
        }
        let config = ProviderConfig::from_lookup("groq", |key| match key {
            "GROQ_API_KEY" => Some("gsk-real".to_string()),
            "GROQ_MODELS" => Some("model-a,model-b".to_string()),
            _ => None,
        })
        .unwrap();
        let provider = build_provider(config, transport.clone(), Arc::new(RoundRobinPicker::new()));

        for _ in 0..6 {
            provider
                .complete(&format_conversation(&[Message::user("hi")]))
                .await
                .unwrap();
        }

        let used: Vec<String> = (0..6)
            .map(|i| transport.request_json(i)["model"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(used.iter().filter(|m| *m == "model-b").count(), 3);
    }
}
