//! End-to-end streaming behavior against scripted mock backends

mod harness;

use std::time::Duration;

use futures_util::StreamExt;
use harness::{ScriptedBackend, Step};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use weft_llm::{ChatMessage, GenerationOptions, ModelConfig, ProviderRegistry, StreamChunk};

async fn collect(
    provider_id: &str,
    model: &str,
    backend: &ScriptedBackend,
    options: GenerationOptions,
) -> Vec<StreamChunk> {
    let registry = ProviderRegistry::new();
    let config = ModelConfig::new(provider_id, model).with_base_url(backend.base_url().parse().unwrap());

    let mut stream = registry
        .stream_chat(
            &[ChatMessage::user("2+2?")],
            &config,
            &options,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let mut chunks = Vec::new();
    while let Some(item) = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("stream should make progress")
    {
        chunks.push(item.expect("no transport errors expected"));
    }
    chunks
}

#[tokio::test]
async fn openai_text_turn_yields_exactly_one_text_event() {
    let backend = ScriptedBackend::start(vec![
        Step::Send("data: {\"choices\":[{\"delta\":{\"content\":\"4\"}}]}\n\n"),
        Step::Send("data: [DONE]\n\n"),
    ])
    .await
    .unwrap();

    let options = GenerationOptions::new().with_max_output_tokens(10);
    let chunks = collect("openai", "gpt-4o", &backend, options).await;

    assert_eq!(chunks, vec![StreamChunk::text("4")]);
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn openai_record_split_mid_json_reassembles() {
    // The record boundary falls inside the JSON payload; the stream must
    // not terminate, and the reassembled record still yields Text("4")
    let backend = ScriptedBackend::start(vec![
        Step::Send("data: {\"choices\":[{\"delta\":{\"content\""),
        Step::Delay(Duration::from_millis(20)),
        Step::Send(":\"4\"}}]}\n\n"),
        Step::Send("data: [DONE]\n\n"),
    ])
    .await
    .unwrap();

    let chunks = collect("openai", "gpt-4o", &backend, GenerationOptions::new()).await;
    assert_eq!(chunks, vec![StreamChunk::text("4")]);
}

#[tokio::test]
async fn openai_fragmented_tool_call_assembles_once() {
    let backend = ScriptedBackend::start(vec![
        Step::Send("data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"function\":{\"name\":\"get_weather\",\"arguments\":\"\"}}]}}]}\n\n"),
        Step::Send("data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"{\\\"location\\\":\"}}]}}]}\n\n"),
        Step::Send("data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"\\\"SF\\\"}\"}}]}}]}\n\n"),
        Step::Send("data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n\n"),
        Step::Send("data: [DONE]\n\n"),
    ])
    .await
    .unwrap();

    let chunks = collect("openai", "gpt-4o", &backend, GenerationOptions::new()).await;

    assert_eq!(chunks.len(), 1);
    let call = chunks[0].as_tool_call().unwrap();
    assert_eq!(call.id, "call_1");
    assert_eq!(call.name, "get_weather");
    assert_eq!(call.input, json!({"location": "SF"}));
}

#[tokio::test]
async fn openai_comment_lines_are_ignored() {
    let backend = ScriptedBackend::start(vec![
        Step::Send(": keep-alive\n\n"),
        Step::Send("data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n"),
        Step::Send("data: [DONE]\n\n"),
    ])
    .await
    .unwrap();

    let chunks = collect("openai", "gpt-4o", &backend, GenerationOptions::new()).await;
    assert_eq!(chunks, vec![StreamChunk::text("ok")]);
}

#[tokio::test]
async fn anthropic_text_and_tool_call_stream() {
    let backend = ScriptedBackend::start(vec![
        Step::Send("event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"type\":\"message\",\"role\":\"assistant\",\"model\":\"m\"}}\n\n"),
        Step::Send("event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Checking\"}}\n\n"),
        Step::Send("event: content_block_start\ndata: {\"type\":\"content_block_start\",\"index\":1,\"content_block\":{\"type\":\"tool_use\",\"id\":\"toolu_1\",\"name\":\"get_weather\",\"input\":{}}}\n\n"),
        Step::Send("event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\\\"location\\\":\"}}\n\n"),
        Step::Send("event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":1,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"\\\"SF\\\"}\"}}\n\n"),
        Step::Send("event: content_block_stop\ndata: {\"type\":\"content_block_stop\",\"index\":1}\n\n"),
        Step::Send("event: message_delta\ndata: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"tool_use\"}}\n\n"),
        Step::Send("event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n"),
    ])
    .await
    .unwrap();

    let chunks = collect("anthropic", "claude-sonnet-4-5", &backend, GenerationOptions::new()).await;

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], StreamChunk::text("Checking"));
    let call = chunks[1].as_tool_call().unwrap();
    assert_eq!(call.id, "toolu_1");
    assert_eq!(call.input, json!({"location": "SF"}));
}

#[tokio::test]
async fn anthropic_record_split_mid_json_reassembles() {
    let backend = ScriptedBackend::start(vec![
        Step::Send("event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_del"),
        Step::Delay(Duration::from_millis(20)),
        Step::Send("ta\",\"text\":\"4\"}}\n\n"),
        Step::Send("event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n"),
    ])
    .await
    .unwrap();

    let chunks = collect("anthropic", "claude-sonnet-4-5", &backend, GenerationOptions::new()).await;
    assert_eq!(chunks, vec![StreamChunk::text("4")]);
}

#[tokio::test]
async fn google_unbounded_array_framing() {
    // No record delimiter at all: one array, split at hostile offsets
    let backend = ScriptedBackend::start(vec![
        Step::Send("[{\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"The \"}]}}]}"),
        Step::Send(",\n{\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"answer\"}]}}"),
        Step::Delay(Duration::from_millis(10)),
        Step::Send("]},\n{\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"functionCall\":{\"name\":\"get_weather\",\"args\":{\"location\":\"SF\"}}}]},\"finishReason\":\"STOP\"}]}]"),
    ])
    .await
    .unwrap();

    let chunks = collect("gemini", "gemini-2.0-flash", &backend, GenerationOptions::new()).await;

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0], StreamChunk::text("The "));
    assert_eq!(chunks[1], StreamChunk::text("answer"));
    let call = chunks[2].as_tool_call().unwrap();
    assert!(call.id.starts_with("gemini_call_0_"));
    assert_eq!(call.input, json!({"location": "SF"}));
}

#[tokio::test]
async fn ollama_line_per_record_framing() {
    let backend = ScriptedBackend::start(vec![
        Step::Send("{\"message\":{\"role\":\"assistant\",\"content\":\"4\"},\"done\":false}\n"),
        Step::Send("{\"message\":{\"role\":\"assistant\",\"content\":\"\",\"tool_calls\":[{\"function\":{\"name\":\"get_weather\",\"arguments\":{\"location\":\"SF\"}}}]},\"done\":false}\n"),
        Step::Send("{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n"),
    ])
    .await
    .unwrap();

    let chunks = collect("ollama", "llama3.2", &backend, GenerationOptions::new()).await;

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], StreamChunk::text("4"));
    let call = chunks[1].as_tool_call().unwrap();
    assert!(call.id.starts_with("ollama_call_0_"));
    assert_eq!(call.name, "get_weather");
}

#[tokio::test]
async fn ollama_record_split_across_chunks() {
    let backend = ScriptedBackend::start(vec![
        Step::Send("{\"message\":{\"role\":\"assistant\",\"con"),
        Step::Delay(Duration::from_millis(10)),
        Step::Send("tent\":\"4\"},\"done\":false}\n{\"done\":true}\n"),
    ])
    .await
    .unwrap();

    let chunks = collect("ollama", "llama3.2", &backend, GenerationOptions::new()).await;
    assert_eq!(chunks, vec![StreamChunk::text("4")]);
}

#[tokio::test]
async fn malformed_records_are_skipped_not_fatal() {
    let backend = ScriptedBackend::start(vec![
        Step::Send("data: {this is not json}\n\n"),
        Step::Send("data: {\"choices\":[{\"delta\":{\"content\":\"still here\"}}]}\n\n"),
        Step::Send("data: [DONE]\n\n"),
    ])
    .await
    .unwrap();

    let chunks = collect("openai", "gpt-4o", &backend, GenerationOptions::new()).await;
    assert_eq!(chunks, vec![StreamChunk::text("still here")]);
}
