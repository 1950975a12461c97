//! Anthropic Messages API provider implementation
//!
//! Content-block family: SSE event-record framing where text arrives in
//! `content_block_delta` records and tool calls arrive as a `tool_use`
//! block start (id and name) followed by `input_json_delta` fragments. The
//! parser stays structurally open to new block kinds: anything it does not
//! recognize is skipped, never fatal.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use super::{ChunkStream, Provider, ProviderCapabilities, http};
use crate::convert;
use crate::error::LlmError;
use crate::protocol::anthropic::{AnthropicStreamContentBlock, AnthropicStreamDelta, AnthropicStreamEvent};
use crate::stream::ToolCallAssembler;
use crate::types::{ChatMessage, GenerationOptions, ModelConfig, StreamChunk};

/// Default Anthropic API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: Client,
}

impl AnthropicProvider {
    /// Create the provider
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn default_base_url(&self) -> Option<&'static str> {
        Some(DEFAULT_BASE_URL)
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
        let base = http::resolve_base_url(self.name(), self.default_base_url(), config)?;
        let wire_request = convert::anthropic::build_request(&config.model, messages, options);

        let mut builder = self
            .client
            .post(format!("{base}/messages"))
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&wire_request);
        if let Some(key) = http::api_key(config) {
            builder = builder.header("x-api-key", key);
        }

        let response = http::send_checked(self.name(), builder).await?;
        let mut events = response.bytes_stream().eventsource();

        let stream = async_stream::stream! {
            let mut parser = EventParser::new();
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
                        match serde_json::from_str::<AnthropicStreamEvent>(data) {
                            Ok(AnthropicStreamEvent::MessageStop) => break,
                            Ok(stream_event) => {
                                for item in parser.events(&stream_event) {
                                    yield Ok(item);
                                }
                            }
                            Err(e) => {
                                tracing::debug!(provider = "anthropic", error = %e, "skipping unparseable SSE record");
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

/// Per-turn parser state for the content-block event walk
///
/// The wire's content block index is shared across all block types, so the
/// tool use that follows a text block starts at block index 1+; tool calls
/// are tracked under their own sequential index instead.
struct EventParser {
    assembler: ToolCallAssembler,
    current_tool: Option<u32>,
    next_tool_index: u32,
}

impl EventParser {
    fn new() -> Self {
        Self {
            assembler: ToolCallAssembler::new("anthropic"),
            current_tool: None,
            next_tool_index: 0,
        }
    }

    /// Convert one stream event into canonical events
    fn events(&mut self, event: &AnthropicStreamEvent) -> Vec<StreamChunk> {
        match event {
            AnthropicStreamEvent::ContentBlockStart { content_block, .. } => {
                match content_block {
                    AnthropicStreamContentBlock::Text { .. } => {}
                    AnthropicStreamContentBlock::ToolUse { id, name } => {
                        let index = self.next_tool_index;
                        self.next_tool_index += 1;
                        self.current_tool = Some(index);
                        self.assembler.fragment(index, Some(id), Some(name), None);
                    }
                }
                Vec::new()
            }

            AnthropicStreamEvent::ContentBlockDelta { delta, .. } => match delta {
                AnthropicStreamDelta::TextDelta { text } => vec![StreamChunk::text(text.clone())],
                AnthropicStreamDelta::InputJsonDelta { partial_json } => {
                    if let Some(index) = self.current_tool {
                        self.assembler.fragment(index, None, None, Some(partial_json));
                    }
                    Vec::new()
                }
            },

            AnthropicStreamEvent::ContentBlockStop { .. } => {
                self.current_tool = None;
                Vec::new()
            }

            AnthropicStreamEvent::MessageDelta { delta } => {
                if delta.stop_reason.is_some() {
                    self.assembler.flush().into_iter().map(StreamChunk::tool_call).collect()
                } else {
                    Vec::new()
                }
            }

            AnthropicStreamEvent::MessageStart | AnthropicStreamEvent::MessageStop | AnthropicStreamEvent::Ping => {
                Vec::new()
            }
        }
    }
}
