//! Ollama provider implementation
//!
//! Line-per-record family: every non-empty line of the response body is one
//! self-contained chat-delta object. Tool calls arrive whole with structured
//! arguments and are emitted immediately with synthesized ids; a record with
//! `done: true` terminates the turn.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use super::{ChunkStream, Provider, ProviderCapabilities, http};
use crate::convert;
use crate::error::LlmError;
use crate::protocol::ollama::OllamaStreamChunk;
use crate::stream::{NdjsonDecoder, ToolCallAssembler};
use crate::types::{ChatMessage, GenerationOptions, ModelConfig, StreamChunk, ToolCall};

/// Default local Ollama endpoint
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama chat provider
pub struct OllamaProvider {
    client: Client,
}

impl OllamaProvider {
    /// Create the provider
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
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
        let wire_request = convert::ollama::build_request(&config.model, messages, options);

        let response = http::send_checked(
            self.name(),
            self.client.post(format!("{base}/api/chat")).json(&wire_request),
        )
        .await?;
        let mut body = response.bytes_stream();

        let stream = async_stream::stream! {
            let mut decoder = NdjsonDecoder::new();
            let mut assembler = ToolCallAssembler::new("ollama");
            'read: loop {
                // None = cancelled, Some(None) = end of body
                let received = tokio::select! {
                    biased;
                    () = cancel.cancelled() => None,
                    chunk = body.next() => Some(chunk),
                };
                let Some(chunk) = received else { break };

                match chunk {
                    Some(Ok(bytes)) => {
                        for line in decoder.feed(&bytes) {
                            let done = line_is_terminal(&line);
                            for item in line_events(&line, &mut assembler) {
                                yield Ok(item);
                            }
                            if done {
                                break 'read;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        yield Err(LlmError::transport(e));
                        break;
                    }
                    None => {
                        // A final record is not required to end in a newline
                        if let Some(line) = decoder.finish() {
                            for item in line_events(&line, &mut assembler) {
                                yield Ok(item);
                            }
                        }
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

fn line_is_terminal(line: &str) -> bool {
    serde_json::from_str::<OllamaStreamChunk>(line).is_ok_and(|c| c.done)
}

/// Convert one chat-delta line into canonical events
fn line_events(line: &str, assembler: &mut ToolCallAssembler) -> Vec<StreamChunk> {
    let chunk: OllamaStreamChunk = match serde_json::from_str(line) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::debug!(provider = "ollama", error = %e, "skipping unparseable record");
            return Vec::new();
        }
    };

    let mut events = Vec::new();
    if let Some(message) = chunk.message {
        if !message.content.is_empty() {
            events.push(StreamChunk::text(message.content));
        }
        if let Some(tool_calls) = message.tool_calls {
            // Calls arrive whole with structured arguments; only the
            // id-synthesis helper is needed
            for call in tool_calls {
                events.push(StreamChunk::tool_call(ToolCall {
                    id: assembler.next_call_id(),
                    name: call.function.name,
                    input: call.function.arguments,
                }));
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_line_yields_text_event() {
        let mut assembler = ToolCallAssembler::new("ollama");
        let events = line_events(
            r#"{"message":{"role":"assistant","content":"4"},"done":false}"#,
            &mut assembler,
        );
        assert_eq!(events, vec![StreamChunk::text("4")]);
    }

    #[test]
    fn whole_tool_calls_are_emitted_immediately() {
        let mut assembler = ToolCallAssembler::new("ollama");
        let events = line_events(
            r#"{"message":{"role":"assistant","content":"","tool_calls":[{"function":{"name":"get_weather","arguments":{"location":"SF"}}}]},"done":false}"#,
            &mut assembler,
        );

        assert_eq!(events.len(), 1);
        let call = events[0].as_tool_call().unwrap();
        assert!(call.id.starts_with("ollama_call_0_"));
        assert_eq!(call.name, "get_weather");
        assert_eq!(call.input, json!({"location": "SF"}));
    }

    #[test]
    fn terminal_line_is_detected() {
        assert!(line_is_terminal(r#"{"message":{"role":"assistant","content":""},"done":true}"#));
        assert!(!line_is_terminal(r#"{"message":{"role":"assistant","content":"x"},"done":false}"#));
        assert!(!line_is_terminal("not json"));
    }

    #[test]
    fn malformed_line_is_skipped() {
        let mut assembler = ToolCallAssembler::new("ollama");
        assert!(line_events("{truncated", &mut assembler).is_empty());
    }
}
