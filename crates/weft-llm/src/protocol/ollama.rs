//! Ollama `/api/chat` wire format types
//!
//! The streamed response is newline-delimited JSON: one complete chat-delta
//! object per line, terminated by a record with `done: true`.

use serde::{Deserialize, Serialize};

// -- Request types --

/// Chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<OllamaMessage>,
    /// Whether to stream the response
    pub stream: bool,
    /// Model options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<OllamaOptions>,
    /// Tool definitions (OpenAI function shape)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<super::openai::OpenAiTool>>,
}

/// Message within a request or response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaMessage {
    /// Message role
    pub role: String,
    /// Text content
    #[serde(default)]
    pub content: String,
    /// Complete tool calls made by the assistant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OllamaToolCall>>,
}

/// Model options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OllamaOptions {
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    /// Stop sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

/// Complete (non-fragmented) tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaToolCall {
    /// Function call details
    pub function: OllamaFunctionCall,
}

/// Function call with already-structured arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaFunctionCall {
    /// Function name
    pub name: String,
    /// Arguments as a JSON object (not an encoded string)
    #[serde(default)]
    pub arguments: serde_json::Value,
}

// -- Streaming types --

/// One line of the streamed response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaStreamChunk {
    /// Incremental message
    #[serde(default)]
    pub message: Option<OllamaMessage>,
    /// Whether this is the terminal record
    #[serde(default)]
    pub done: bool,
}
