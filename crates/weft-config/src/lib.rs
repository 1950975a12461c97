//! Configuration for weft providers and models
//!
//! Settings are loaded from a TOML file with `{{ env.VAR }}` placeholder
//! expansion, then validated. Credential resolution beyond config-file keys
//! (keychains, editor secret stores) is a host concern and stays outside
//! this crate.

#![allow(clippy::must_use_candidate)]

mod env;
mod loader;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Top-level weft configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Provider settings keyed by provider id
    #[serde(default)]
    pub providers: IndexMap<String, ProviderSettings>,
}

impl Config {
    /// Settings for one provider id, if configured
    pub fn provider(&self, provider_id: &str) -> Option<&ProviderSettings> {
        self.providers.get(provider_id)
    }
}

/// Settings for a single provider
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// Whether this provider is offered to the host (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model identifiers to expose
    #[serde(default)]
    pub models: Vec<ModelSettings>,
}

const fn default_enabled() -> bool {
    true
}

/// Settings for one model under a provider
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSettings {
    /// Model identifier as used by the provider's API
    pub model: String,
    /// Display name for the host's model picker
    #[serde(default)]
    pub name: Option<String>,
    /// Maximum context length in tokens
    #[serde(default)]
    pub context_length: Option<u32>,
    /// Whether the model supports tool calling (default: true)
    #[serde(default = "default_enabled")]
    pub tool_calling: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn parses_provider_table() {
        let raw = indoc! {r#"
            [providers.openai]
            api_key = "sk-test"

            [[providers.openai.models]]
            model = "gpt-4o"
            name = "GPT-4o"
            context_length = 128000

            [providers.ollama]
            base_url = "http://localhost:11434"
        "#};

        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.providers.len(), 2);

        let openai = config.provider("openai").unwrap();
        assert!(openai.enabled);
        assert!(openai.api_key.is_some());
        assert_eq!(openai.models[0].model, "gpt-4o");
        assert_eq!(openai.models[0].name.as_deref(), Some("GPT-4o"));
        assert!(openai.models[0].tool_calling);

        let ollama = config.provider("ollama").unwrap();
        assert_eq!(ollama.base_url.as_ref().unwrap().as_str(), "http://localhost:11434/");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = indoc! {r#"
            [providers.openai]
            api_keey = "typo"
        "#};
        assert!(toml::from_str::<Config>(raw).is_err());
    }
}
