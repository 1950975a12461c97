//! Google Generative Language API provider implementation
//!
//! Renamed-role array family: `streamGenerateContent` answers with one
//! unbounded JSON array and no record delimiter, so records are recovered by
//! the incremental [`JsonArrayDecoder`] rather than line splitting. Tool
//! calls arrive whole (never fragmented) and are emitted immediately with
//! synthesized ids.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use super::{ChunkStream, Provider, ProviderCapabilities, http};
use crate::convert;
use crate::error::LlmError;
use crate::protocol::google::{GooglePart, GoogleStreamChunk};
use crate::stream::{JsonArrayDecoder, ToolCallAssembler};
use crate::types::{ChatMessage, GenerationOptions, ModelConfig, StreamChunk, ToolCall};

/// Default Google Generative Language API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Generative Language API provider
pub struct GoogleProvider {
    client: Client,
}

impl GoogleProvider {
    /// Create the provider
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for GoogleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for GoogleProvider {
    fn name(&self) -> &'static str {
        "gemini"
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
        let wire_request = convert::google::build_request(messages, options);

        let mut url = format!("{base}/models/{}:streamGenerateContent", config.model);
        if let Some(key) = http::api_key(config) {
            use std::fmt::Write;
            let _ = write!(url, "?key={key}");
        }

        let response = http::send_checked(self.name(), self.client.post(&url).json(&wire_request)).await?;
        let mut body = response.bytes_stream();

        let stream = async_stream::stream! {
            let mut decoder = JsonArrayDecoder::new();
            let mut assembler = ToolCallAssembler::new("gemini");
            loop {
                let chunk = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    chunk = body.next() => match chunk {
                        Some(chunk) => chunk,
                        None => break,
                    },
                };

                match chunk {
                    Ok(bytes) => {
                        for record in decoder.feed(&bytes) {
                            match serde_json::from_str::<GoogleStreamChunk>(&record) {
                                Ok(parsed) => {
                                    for item in record_events(&parsed, &mut assembler) {
                                        yield Ok(item);
                                    }
                                }
                                Err(e) => {
                                    tracing::debug!(provider = "gemini", error = %e, "skipping unparseable record");
                                }
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

/// Convert one extracted array element into canonical events
fn record_events(chunk: &GoogleStreamChunk, assembler: &mut ToolCallAssembler) -> Vec<StreamChunk> {
    let mut events = Vec::new();

    for candidate in &chunk.candidates {
        let Some(content) = &candidate.content else {
            continue;
        };
        for part in &content.parts {
            match part {
                GooglePart::Text(text) => {
                    if !text.is_empty() {
                        events.push(StreamChunk::text(text.clone()));
                    }
                }
                GooglePart::FunctionCall(call) => {
                    // Calls arrive whole; no accumulation phase, only the
                    // id-synthesis helper
                    events.push(StreamChunk::tool_call(ToolCall {
                        id: assembler.next_call_id(),
                        name: call.name.clone(),
                        input: call.args.clone(),
                    }));
                }
                GooglePart::FunctionResponse(_) => {}
            }
        }
    }

    events
}
