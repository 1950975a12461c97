//! Conversion from canonical types to the Anthropic Messages wire format
//!
//! Split-system family: the wire forbids a system role inside the turn list,
//! so system messages are concatenated into the top-level `system` field,
//! and the remaining turns are merged so no two consecutive entries share a
//! role (the wire requires strict user/assistant alternation).

use crate::protocol::anthropic::{
    AnthropicContent, AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicTool, AnthropicToolChoice,
};
use crate::types::{ChatMessage, Content, ContentPart, GenerationOptions, Role, Tool, ToolChoice};

/// Default max tokens when not specified (the wire requires this field)
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Build a streaming messages request
pub fn build_request(model: &str, messages: &[ChatMessage], options: &GenerationOptions) -> AnthropicRequest {
    let mut system_parts: Vec<String> = Vec::new();
    let mut turns: Vec<AnthropicMessage> = Vec::new();

    for message in messages {
        if message.role == Role::System {
            system_parts.push(message.content.as_text());
        } else {
            merge_or_push(&mut turns, wire_message(message));
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    AnthropicRequest {
        model: model.to_owned(),
        max_tokens: options.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        system,
        messages: turns,
        temperature: options.temperature,
        stop_sequences: options.stop_sequences.clone(),
        stream: Some(true),
        tools: options.tools.as_ref().map(|tools| tools.iter().map(wire_tool).collect()),
        tool_choice: options.tools.as_ref().map(|_| wire_tool_choice(options.tool_choice)),
    }
}

/// Append a turn, merging it into the previous one when the roles match
fn merge_or_push(turns: &mut Vec<AnthropicMessage>, message: AnthropicMessage) {
    if let Some(last) = turns.last_mut()
        && last.role == message.role
    {
        let mut blocks = into_blocks(std::mem::replace(&mut last.content, AnthropicContent::Text(String::new())));
        blocks.extend(into_blocks(message.content));
        last.content = AnthropicContent::Blocks(blocks);
        return;
    }
    turns.push(message);
}

fn into_blocks(content: AnthropicContent) -> Vec<AnthropicContentBlock> {
    match content {
        AnthropicContent::Text(text) => vec![AnthropicContentBlock::Text { text }],
        AnthropicContent::Blocks(blocks) => blocks,
    }
}

/// Convert one canonical message to a wire turn
fn wire_message(message: &ChatMessage) -> AnthropicMessage {
    let role = match message.role {
        Role::Assistant => "assistant",
        // Tool results ride in user turns on this wire
        Role::User | Role::Tool | Role::System => "user",
    };

    let content = match &message.content {
        Content::Text(text) => AnthropicContent::Text(super::openai::placeholder_if_empty(text.clone())),
        Content::Parts(parts) => {
            let blocks: Vec<AnthropicContentBlock> = parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => AnthropicContentBlock::Text {
                        text: super::openai::placeholder_if_empty(text.clone()),
                    },
                    ContentPart::ToolUse { id, name, input } => AnthropicContentBlock::ToolUse {
                        id: id.clone(),
                        name: name.clone(),
                        input: input.clone(),
                    },
                    ContentPart::ToolResult {
                        tool_call_id,
                        content,
                        is_error,
                    } => AnthropicContentBlock::ToolResult {
                        tool_use_id: tool_call_id.clone(),
                        content: Some(content.clone()),
                        is_error: is_error.then_some(true),
                    },
                })
                .collect();
            if blocks.is_empty() {
                AnthropicContent::Text(" ".to_owned())
            } else {
                AnthropicContent::Blocks(blocks)
            }
        }
    };

    AnthropicMessage {
        role: role.to_owned(),
        content,
    }
}

fn wire_tool(tool: &Tool) -> AnthropicTool {
    AnthropicTool {
        name: tool.name.clone(),
        description: Some(tool.description.clone()),
        input_schema: tool.schema_or_empty(),
    }
}

fn wire_tool_choice(choice: ToolChoice) -> AnthropicToolChoice {
    let choice_type = match choice {
        // The wire has no "none" mode; map both None and Auto to "auto"
        ToolChoice::Auto | ToolChoice::None => "auto",
        ToolChoice::Required => "any",
    };
    AnthropicToolChoice {
        choice_type: choice_type.to_owned(),
        name: None,
    }
}
