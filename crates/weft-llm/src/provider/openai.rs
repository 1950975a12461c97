//! OpenAI-compatible provider implementation
//!
//! Flat-role delta family: SSE event-record framing, incremental tool-call
//! fragments keyed by index, `[DONE]` sentinel. One implementation serves
//! every OpenAI-compatible backend; the variants differ only in name and
//! default endpoint.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use super::{ChunkStream, Provider, ProviderCapabilities, http};
use crate::convert;
use crate::error::LlmError;
use crate::protocol::openai::OpenAiStreamChunk;
use crate::stream::ToolCallAssembler;
use crate::types::{ChatMessage, GenerationOptions, ModelConfig, StreamChunk};

/// OpenAI-compatible provider
pub struct OpenAiProvider {
    name: &'static str,
    default_base_url: Option<&'static str>,
    client: Client,
}

impl OpenAiProvider {
    /// The canonical OpenAI API
    pub fn openai() -> Self {
        Self::compatible("openai", Some("https://api.openai.com/v1"))
    }

    /// Azure OpenAI; the caller must supply the resource endpoint
    pub fn azure() -> Self {
        Self::compatible("azure", None)
    }

    /// `OpenRouter` aggregation endpoint
    pub fn openrouter() -> Self {
        Self::compatible("openrouter", Some("https://openrouter.ai/api/v1"))
    }

    /// Mistral platform endpoint
    pub fn mistral() -> Self {
        Self::compatible("mistral", Some("https://api.mistral.ai/v1"))
    }

    /// Any OpenAI-compatible backend
    pub fn compatible(name: &'static str, default_base_url: Option<&'static str>) -> Self {
        Self {
            name,
            default_base_url,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn default_base_url(&self) -> Option<&'static str> {
        self.default_base_url
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            streaming: true,
            tool_calling: true,
        }
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfig,
        options: &GenerationOptions,
        cancel: CancellationToken,
    ) -> Result<ChunkStream, LlmError> {
        let base = http::resolve_base_url(self.name, self.default_base_url, config)?;
        let wire_request = convert::openai::build_request(&config.model, messages, options);

        let mut builder = self.client.post(format!("{base}/chat/completions")).json(&wire_request);
        if let Some(key) = http::api_key(config) {
            builder = builder.bearer_auth(key);
        }

        let response = http::send_checked(self.name, builder).await?;
        let mut events = response.bytes_stream().eventsource();

        let provider = self.name;
        let stream = async_stream::stream! {
            let mut assembler = ToolCallAssembler::new(provider);
            loop {
                let event = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    event = events.next() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };

                match event {
                    Ok(event) => {
                        let data = event.data.trim();
                        if data.is_empty() {
                            continue;
                        }
                        // Sentinel: ends the stream without a final record
                        if data == "[DONE]" {
                            break;
                        }
                        match serde_json::from_str::<OpenAiStreamChunk>(data) {
                            Ok(chunk) => {
                                for item in record_events(&chunk, &mut assembler) {
                                    yield Ok(item);
                                }
                            }
                            Err(e) => {
                                tracing::debug!(provider, error = %e, "skipping unparseable SSE record");
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(LlmError::transport(e));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Convert one delta record into canonical events
///
/// Tool-call fragments are handed to the assembler, never emitted directly;
/// a terminal finish reason flushes every pending call.
fn record_events(chunk: &OpenAiStreamChunk, assembler: &mut ToolCallAssembler) -> Vec<StreamChunk> {
    let mut events = Vec::new();

    for choice in &chunk.choices {
        if let Some(content) = &choice.delta.content
            && !content.is_empty()
        {
            events.push(StreamChunk::text(content.clone()));
        }

        if let Some(tool_calls) = &choice.delta.tool_calls {
            for fragment in tool_calls {
                let (name, arguments) = fragment
                    .function
                    .as_ref()
                    .map_or((None, None), |f| (f.name.as_deref(), f.arguments.as_deref()));
                assembler.fragment(fragment.index, fragment.id.as_deref(), name, arguments);
            }
        }

        if matches!(choice.finish_reason.as_deref(), Some("stop" | "tool_calls")) {
            events.extend(assembler.flush().into_iter().map(StreamChunk::tool_call));
        }
    }

    events
}
