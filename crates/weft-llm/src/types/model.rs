use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for one model on one provider, supplied per call
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Provider identifier (e.g. "openai", "anthropic", "ollama")
    pub provider_id: String,
    /// Model identifier as used by the provider's API
    pub model: String,
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override; required for providers with no default endpoint
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Capabilities of the model
    #[serde(default)]
    pub capabilities: ModelCapabilities,
}

impl ModelConfig {
    /// Create a config with the provider's default endpoint and no credential
    pub fn new(provider_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            model: model.into(),
            api_key: None,
            base_url: None,
            capabilities: ModelCapabilities::default(),
        }
    }

    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Set the capabilities
    #[must_use]
    pub const fn with_capabilities(mut self, capabilities: ModelCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Build a per-call config from loaded provider settings
    pub fn from_settings(
        provider_id: impl Into<String>,
        model: impl Into<String>,
        settings: &weft_config::ProviderSettings,
    ) -> Self {
        let model = model.into();
        let tool_calling = settings
            .models
            .iter()
            .find(|m| m.model == model)
            .is_none_or(|m| m.tool_calling);

        Self {
            provider_id: provider_id.into(),
            model,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            capabilities: ModelCapabilities {
                tool_calling,
                ..ModelCapabilities::default()
            },
        }
    }
}

/// Capabilities of a model
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelCapabilities {
    /// Whether the model supports streaming responses
    #[serde(default = "default_true")]
    pub streaming: bool,
    /// Whether the model supports tool calling
    #[serde(default = "default_true")]
    pub tool_calling: bool,
    /// Whether the model accepts image input
    #[serde(default)]
    pub image_input: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            streaming: true,
            tool_calling: true,
            image_input: false,
        }
    }
}

impl ModelCapabilities {
    /// Capabilities with every feature enabled
    pub const fn full() -> Self {
        Self {
            streaming: true,
            tool_calling: true,
            image_input: true,
        }
    }
}
