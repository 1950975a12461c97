//! Conversion from canonical types to the Google Generative Language wire format
//!
//! Renamed-role family: assistant turns become `"model"`, system content is
//! extracted into the top-level `systemInstruction`, and tool traffic rides
//! in `functionCall`/`functionResponse` parts.

use crate::protocol::google::{
    GoogleContent, GoogleFunctionCall, GoogleFunctionCallingConfig, GoogleFunctionDeclaration, GoogleFunctionResponse,
    GoogleGenerationConfig, GooglePart, GoogleRequest, GoogleTool, GoogleToolConfig,
};
use crate::types::{ChatMessage, Content, ContentPart, GenerationOptions, Role, Tool, ToolChoice};

/// Build a streaming `streamGenerateContent` request
pub fn build_request(messages: &[ChatMessage], options: &GenerationOptions) -> GoogleRequest {
    let mut system_parts: Vec<String> = Vec::new();
    let mut contents = Vec::new();

    for message in messages {
        match message.role {
            Role::System => system_parts.push(message.content.as_text()),
            Role::User => contents.push(wire_content(message, "user")),
            Role::Assistant => contents.push(wire_content(message, "model")),
            Role::Tool => {
                if let Some(content) = function_response_content(message) {
                    contents.push(content);
                }
            }
        }
    }

    let system_instruction = if system_parts.is_empty() {
        None
    } else {
        Some(GoogleContent {
            role: None,
            parts: vec![GooglePart::Text(system_parts.join("\n\n"))],
        })
    };

    let generation_config = Some(GoogleGenerationConfig {
        temperature: options.temperature,
        max_output_tokens: options.max_output_tokens,
        stop_sequences: options.stop_sequences.clone(),
    });

    let tools = options.tools.as_ref().map(|tools| {
        vec![GoogleTool {
            function_declarations: tools
                .iter()
                .map(|t| GoogleFunctionDeclaration {
                    name: t.name.clone(),
                    description: Some(t.description.clone()),
                    parameters: t.schema_or_empty(),
                })
                .collect(),
        }]
    });

    let tool_config = options.tools.as_ref().map(|_| GoogleToolConfig {
        function_calling_config: GoogleFunctionCallingConfig {
            mode: match options.tool_choice {
                ToolChoice::None => "NONE",
                ToolChoice::Auto => "AUTO",
                ToolChoice::Required => "ANY",
            }
            .to_owned(),
        },
    });

    GoogleRequest {
        contents,
        system_instruction,
        generation_config,
        tools,
        tool_config,
    }
}

/// Convert one canonical message to a content object under the given role
fn wire_content(message: &ChatMessage, role: &str) -> GoogleContent {
    let mut parts = Vec::new();

    match &message.content {
        Content::Text(text) => {
            if !text.is_empty() {
                parts.push(GooglePart::Text(text.clone()));
            }
        }
        Content::Parts(content_parts) => {
            for part in content_parts {
                match part {
                    ContentPart::Text { text } => {
                        if !text.is_empty() {
                            parts.push(GooglePart::Text(text.clone()));
                        }
                    }
                    ContentPart::ToolUse { name, input, .. } => {
                        parts.push(GooglePart::FunctionCall(GoogleFunctionCall {
                            name: name.clone(),
                            args: input.clone(),
                        }));
                    }
                    // Tool results never appear under user/model roles
                    ContentPart::ToolResult { .. } => {}
                }
            }
        }
    }

    // The wire rejects a content object with no parts; also covers the
    // empty-text placeholder rule
    if parts.is_empty() {
        parts.push(GooglePart::Text(" ".to_owned()));
    }

    GoogleContent {
        role: Some(role.to_owned()),
        parts,
    }
}

/// Convert a tool-role message into a `functionResponse` content object
fn function_response_content(message: &ChatMessage) -> Option<GoogleContent> {
    let Content::Parts(parts) = &message.content else {
        return None;
    };

    let responses: Vec<GooglePart> = parts
        .iter()
        .filter_map(|part| match part {
            ContentPart::ToolResult {
                tool_call_id, content, ..
            } => {
                let response = serde_json::from_str(content)
                    .unwrap_or_else(|_| serde_json::json!({"result": content}));
                Some(GooglePart::FunctionResponse(GoogleFunctionResponse {
                    name: tool_call_id.clone(),
                    response,
                }))
            }
            _ => None,
        })
        .collect();

    if responses.is_empty() {
        None
    } else {
        Some(GoogleContent {
            role: Some("function".to_owned()),
            parts: responses,
        })
    }
}
