use serde::{Deserialize, Serialize};

use super::tool::ToolCall;

/// Canonical streaming event, the only output type of the engine
///
/// Tool calls are emitted at most once per logical invocation and only after
/// their arguments are fully assembled; no partial tool-call chunks exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    /// Incremental text fragment
    Text {
        /// The text fragment
        text: String,
    },
    /// Fully-assembled tool invocation request
    ToolCall {
        /// The completed call
        call: ToolCall,
    },
}

impl StreamChunk {
    /// Create a text chunk
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a tool call chunk
    pub const fn tool_call(call: ToolCall) -> Self {
        Self::ToolCall { call }
    }

    /// Text content, if this is a text chunk
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ToolCall { .. } => None,
        }
    }

    /// The completed call, if this is a tool call chunk
    pub const fn as_tool_call(&self) -> Option<&ToolCall> {
        match self {
            Self::ToolCall { call } => Some(call),
            Self::Text { .. } => None,
        }
    }
}
