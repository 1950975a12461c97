//! Provider registry and streaming facade
//!
//! One instance per backend family, keyed by lowercase provider id, created
//! lazily on first use and cached for concurrent reads across simultaneous
//! streaming calls.

use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;
use crate::provider::anthropic::AnthropicProvider;
use crate::provider::google::GoogleProvider;
use crate::provider::ollama::OllamaProvider;
use crate::provider::openai::OpenAiProvider;
use crate::provider::{ChunkStream, Provider};
use crate::types::{ChatMessage, GenerationOptions, ModelConfig};

/// Registry of backend-family implementations
#[derive(Default)]
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry; instances are constructed on first use
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider ids this registry can construct
    pub const fn supported_providers() -> &'static [&'static str] {
        &[
            "openai",
            "azure",
            "openrouter",
            "mistral",
            "anthropic",
            "gemini",
            "google",
            "ollama",
        ]
    }

    /// Stream one chat turn through the provider named in `config`
    ///
    /// Returns a lazy, forward-only, single-pass event sequence; driving it
    /// performs the network I/O. Signaling `cancel` ends the sequence
    /// promptly and silently.
    ///
    /// # Errors
    ///
    /// [`LlmError::Configuration`] for an unknown provider id or a missing
    /// required endpoint (no I/O attempted); [`LlmError::Transport`] when
    /// the upstream request fails.
    pub async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfig,
        options: &GenerationOptions,
        cancel: CancellationToken,
    ) -> Result<ChunkStream, LlmError> {
        let provider = self.resolve(&config.provider_id)?;
        provider.stream_chat(messages, config, options, cancel).await
    }

    /// Cheap token estimate for `text` under the named provider
    ///
    /// # Errors
    ///
    /// [`LlmError::Configuration`] for an unknown provider id.
    pub fn estimate_tokens(&self, provider_id: &str, text: &str) -> Result<usize, LlmError> {
        Ok(self.resolve(provider_id)?.estimate_tokens(text))
    }

    /// Look up or lazily construct the provider for `provider_id`
    fn resolve(&self, provider_id: &str) -> Result<Arc<dyn Provider>, LlmError> {
        let key = provider_id.to_lowercase();
        if let Some(provider) = self.providers.get(&key) {
            return Ok(Arc::clone(&provider));
        }

        let provider: Arc<dyn Provider> = match key.as_str() {
            "openai" => Arc::new(OpenAiProvider::openai()),
            "azure" => Arc::new(OpenAiProvider::azure()),
            "openrouter" => Arc::new(OpenAiProvider::openrouter()),
            "mistral" => Arc::new(OpenAiProvider::mistral()),
            "anthropic" => Arc::new(AnthropicProvider::new()),
            "gemini" | "google" => Arc::new(GoogleProvider::new()),
            "ollama" => Arc::new(OllamaProvider::new()),
            _ => return Err(LlmError::Configuration(format!("unknown provider: {provider_id}"))),
        };

        let entry = self.providers.entry(key).or_insert(provider);
        Ok(Arc::clone(&entry))
    }
}
