//! Provider trait and per-family implementations
//!
//! Each backend family is an independent variant behind one capability-set
//! contract; shared HTTP wiring and error translation live in [`http`] as
//! free helpers taken by every variant, not inherited behavior.

pub mod anthropic;
pub mod google;
mod http;
pub mod ollama;
pub mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;
use crate::types::{ChatMessage, GenerationOptions, ModelConfig, StreamChunk};

/// Lazy, forward-only, single-pass canonical event sequence
///
/// Driving the stream performs network I/O; dropping it releases the
/// underlying connection.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, LlmError>> + Send>>;

/// Capabilities advertised by a provider
#[derive(Debug, Clone, Copy)]
pub struct ProviderCapabilities {
    /// Whether the provider supports streaming responses
    pub streaming: bool,
    /// Whether the provider supports tool calling
    pub tool_calling: bool,
}

/// Trait implemented by each backend family
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "openai", "anthropic")
    fn name(&self) -> &'static str;

    /// Default endpoint, or `None` when the caller must supply one
    fn default_base_url(&self) -> Option<&'static str>;

    /// Advertised capabilities
    fn capabilities(&self) -> ProviderCapabilities;

    /// Stream one chat turn as canonical events
    ///
    /// Signaling `cancel` stops the stream promptly and without error; the
    /// sequence simply ends.
    ///
    /// # Errors
    ///
    /// [`LlmError::Configuration`] before any I/O when the request cannot be
    /// issued as configured; [`LlmError::Transport`] when the upstream
    /// request fails or returns a non-success status.
    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfig,
        options: &GenerationOptions,
        cancel: CancellationToken,
    ) -> Result<ChunkStream, LlmError>;

    /// Cheap length-based token estimate (~4 characters per token)
    fn estimate_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}
