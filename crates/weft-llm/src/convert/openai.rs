//! Conversion from canonical types to the OpenAI-compatible wire format
//!
//! Flat-role family: roles are preserved as-is, an assistant tool invocation
//! becomes the `tool_calls` attribute of an assistant entry, and a tool
//! result becomes its own `tool`-role entry referencing the originating call.

use crate::protocol::openai::{
    OpenAiFunction, OpenAiFunctionCall, OpenAiMessage, OpenAiRequest, OpenAiTool, OpenAiToolCall,
};
use crate::types::{ChatMessage, Content, ContentPart, GenerationOptions, Tool, ToolChoice};

/// Build a streaming chat completion request
pub fn build_request(model: &str, messages: &[ChatMessage], options: &GenerationOptions) -> OpenAiRequest {
    let mut wire_messages = Vec::with_capacity(messages.len());
    for message in messages {
        push_message(&mut wire_messages, message);
    }

    OpenAiRequest {
        model: model.to_owned(),
        messages: wire_messages,
        temperature: options.temperature,
        max_tokens: options.max_output_tokens,
        stop: options.stop_sequences.clone(),
        stream: Some(true),
        tools: options.tools.as_ref().map(|tools| tools.iter().map(wire_tool).collect()),
        tool_choice: options.tools.as_ref().map(|_| tool_choice_value(options.tool_choice).to_owned()),
    }
}

/// Convert one canonical message into one or more wire entries
fn push_message(out: &mut Vec<OpenAiMessage>, message: &ChatMessage) {
    let mut text = String::new();
    let mut tool_calls = Vec::new();
    let mut tool_results = Vec::new();
    let had_parts = matches!(message.content, Content::Parts(_));

    match &message.content {
        Content::Text(t) => text.push_str(t),
        Content::Parts(parts) => {
            for part in parts {
                match part {
                    ContentPart::Text { text: t } => text.push_str(t),
                    ContentPart::ToolUse { id, name, input } => {
                        let arguments = serde_json::to_string(input).unwrap_or_else(|_| "{}".to_owned());
                        tool_calls.push(OpenAiToolCall {
                            id: id.clone(),
                            tool_type: "function".to_owned(),
                            function: OpenAiFunctionCall {
                                name: name.clone(),
                                arguments,
                            },
                        });
                    }
                    ContentPart::ToolResult {
                        tool_call_id, content, ..
                    } => tool_results.push((tool_call_id.clone(), content.clone())),
                }
            }
        }
    }

    // Tool results are their own wire entries with the "tool" role
    let had_results = !tool_results.is_empty();
    for (tool_call_id, content) in tool_results {
        out.push(OpenAiMessage {
            role: "tool".to_owned(),
            content: Some(placeholder_if_empty(content)),
            tool_calls: None,
            tool_call_id: Some(tool_call_id),
        });
    }

    if tool_calls.is_empty() {
        // A parts message that held only tool results produces no extra entry
        if !had_results || !text.is_empty() || !had_parts {
            out.push(OpenAiMessage {
                role: message.role.to_string(),
                content: Some(placeholder_if_empty(text)),
                tool_calls: None,
                tool_call_id: None,
            });
        }
    } else {
        out.push(OpenAiMessage {
            role: message.role.to_string(),
            content: if text.is_empty() { None } else { Some(text) },
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        });
    }
}

/// Several backends reject strictly empty content
pub(crate) fn placeholder_if_empty(text: String) -> String {
    if text.is_empty() { " ".to_owned() } else { text }
}

fn wire_tool(tool: &Tool) -> OpenAiTool {
    OpenAiTool {
        tool_type: "function".to_owned(),
        function: OpenAiFunction {
            name: tool.name.clone(),
            description: Some(tool.description.clone()),
            parameters: tool.schema_or_empty(),
        },
    }
}

const fn tool_choice_value(choice: ToolChoice) -> &'static str {
    match choice {
        ToolChoice::Auto => "auto",
        ToolChoice::None => "none",
        ToolChoice::Required => "required",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use serde_json::json;

    #[test]
    fn roles_are_preserved() {
        let messages = vec![
            ChatMessage::system("be terse"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ];
        let request = build_request("gpt-4o", &messages, &GenerationOptions::new());

        let roles: Vec<_> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
    }

    #[test]
    fn tool_use_becomes_assistant_attribute() {
        let messages = vec![ChatMessage::with_parts(
            Role::Assistant,
            vec![
                ContentPart::Text {
                    text: "checking".to_owned(),
                },
                ContentPart::ToolUse {
                    id: "call_1".to_owned(),
                    name: "get_weather".to_owned(),
                    input: json!({"location": "SF"}),
                },
            ],
        )];
        let request = build_request("gpt-4o", &messages, &GenerationOptions::new());

        assert_eq!(request.messages.len(), 1);
        let entry = &request.messages[0];
        assert_eq!(entry.role, "assistant");
        assert_eq!(entry.content.as_deref(), Some("checking"));
        let calls = entry.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].function.arguments, "{\"location\":\"SF\"}");
    }

    #[test]
    fn tool_result_becomes_tool_role_entry() {
        let messages = vec![ChatMessage::tool_result("call_1", "sunny", false)];
        let request = build_request("gpt-4o", &messages, &GenerationOptions::new());

        assert_eq!(request.messages.len(), 1);
        let entry = &request.messages[0];
        assert_eq!(entry.role, "tool");
        assert_eq!(entry.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(entry.content.as_deref(), Some("sunny"));
    }

    #[test]
    fn empty_content_gets_placeholder() {
        let messages = vec![ChatMessage::user("")];
        let request = build_request("gpt-4o", &messages, &GenerationOptions::new());
        assert_eq!(request.messages[0].content.as_deref(), Some(" "));
    }

    #[test]
    fn parameterless_tool_serializes_empty_object_schema() {
        let options = GenerationOptions::new().with_tools(vec![Tool::new("ping", "Check liveness")]);
        let request = build_request("gpt-4o", &[ChatMessage::user("go")], &options);

        let tools = request.tools.unwrap();
        assert_eq!(
            tools[0].function.parameters,
            json!({"type": "object", "properties": {}})
        );
        assert_eq!(request.tool_choice.as_deref(), Some("auto"));
    }

    #[test]
    fn tool_choice_maps_directly() {
        let options = GenerationOptions::new()
            .with_tools(vec![Tool::new("f", "d")])
            .with_tool_choice(ToolChoice::Required);
        let request = build_request("gpt-4o", &[ChatMessage::user("go")], &options);
        assert_eq!(request.tool_choice.as_deref(), Some("required"));
    }

    #[test]
    fn generation_options_are_serialized() {
        let options = GenerationOptions::new()
            .with_temperature(0.5)
            .with_max_output_tokens(10)
            .with_stop_sequences(vec!["END".to_owned()]);
        let request = build_request("gpt-4o", &[ChatMessage::user("2+2?")], &options);

        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.max_tokens, Some(10));
        assert_eq!(request.stop.as_deref(), Some(&["END".to_owned()][..]));
        assert_eq!(request.stream, Some(true));
        assert!(request.tools.is_none());
        assert!(request.tool_choice.is_none());
    }
}
