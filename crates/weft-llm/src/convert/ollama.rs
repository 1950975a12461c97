//! Conversion from canonical types to the Ollama `/api/chat` wire format
//!
//! Flat-role family like the OpenAI wire, but generation parameters ride in
//! an `options` object and tool-call arguments are structured JSON rather
//! than encoded strings.

use crate::protocol::ollama::{OllamaFunctionCall, OllamaMessage, OllamaOptions, OllamaRequest, OllamaToolCall};
use crate::protocol::openai::{OpenAiFunction, OpenAiTool};
use crate::types::{ChatMessage, Content, ContentPart, GenerationOptions};

/// Build a streaming chat request
pub fn build_request(model: &str, messages: &[ChatMessage], options: &GenerationOptions) -> OllamaRequest {
    let mut wire_messages = Vec::with_capacity(messages.len());
    for message in messages {
        push_message(&mut wire_messages, message);
    }

    let wire_options = OllamaOptions {
        temperature: options.temperature,
        num_predict: options.max_output_tokens,
        stop: options.stop_sequences.clone(),
    };

    OllamaRequest {
        model: model.to_owned(),
        messages: wire_messages,
        stream: true,
        options: Some(wire_options),
        tools: options.tools.as_ref().map(|tools| {
            tools
                .iter()
                .map(|t| OpenAiTool {
                    tool_type: "function".to_owned(),
                    function: OpenAiFunction {
                        name: t.name.clone(),
                        description: Some(t.description.clone()),
                        parameters: t.schema_or_empty(),
                    },
                })
                .collect()
        }),
    }
}

/// Convert one canonical message into one or more wire entries
fn push_message(out: &mut Vec<OllamaMessage>, message: &ChatMessage) {
    let mut text = String::new();
    let mut tool_calls = Vec::new();
    let mut had_result = false;

    match &message.content {
        Content::Text(t) => text.push_str(t),
        Content::Parts(parts) => {
            for part in parts {
                match part {
                    ContentPart::Text { text: t } => text.push_str(t),
                    ContentPart::ToolUse { name, input, .. } => {
                        tool_calls.push(OllamaToolCall {
                            function: OllamaFunctionCall {
                                name: name.clone(),
                                arguments: input.clone(),
                            },
                        });
                    }
                    ContentPart::ToolResult { content, .. } => {
                        had_result = true;
                        out.push(OllamaMessage {
                            role: "tool".to_owned(),
                            content: super::openai::placeholder_if_empty(content.clone()),
                            tool_calls: None,
                        });
                    }
                }
            }
        }
    }

    if tool_calls.is_empty() {
        // A parts message that held only tool results produces no extra entry
        if !had_result || !text.is_empty() {
            out.push(OllamaMessage {
                role: message.role.to_string(),
                content: super::openai::placeholder_if_empty(text),
                tool_calls: None,
            });
        }
    } else {
        out.push(OllamaMessage {
            role: message.role.to_string(),
            content: text,
            tool_calls: Some(tool_calls),
        });
    }
}
