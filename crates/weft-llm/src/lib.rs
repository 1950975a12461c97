//! Provider streaming normalization engine
//!
//! Translates one canonical conversation representation into each backend's
//! request format, consumes each backend's streaming wire format (SSE event
//! records, newline-delimited JSON, or one unbounded JSON array), and
//! produces a single canonical event sequence of text fragments and
//! fully-assembled tool calls.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod registry;
pub mod stream;
pub mod types;

pub use error::LlmError;
pub use provider::{ChunkStream, Provider, ProviderCapabilities};
pub use registry::ProviderRegistry;
pub use types::{
    ChatMessage, Content, ContentPart, GenerationOptions, ModelCapabilities, ModelConfig, Role, StreamChunk, Tool,
    ToolCall, ToolChoice, ToolResult,
};
