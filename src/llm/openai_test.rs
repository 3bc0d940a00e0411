use super::*;
use crate::llm::types::ResponseSchema;

fn sample_request() -> StructuredRequest {
    StructuredRequest {
        system: "sys".into(),
        prompt: "user prompt".into(),
        max_tokens: 256,
        schema: ResponseSchema { name: "layout".into(), description: "desc".into(), schema: json!({"type": "object"}) },
    }
}

#[test]
fn chat_completions_request_uses_json_schema_format() {
    let body = build_chat_completions_request("gpt-4o", &sample_request());
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "user prompt");
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(body["response_format"]["json_schema"]["name"], "layout");
    assert_eq!(body["response_format"]["json_schema"]["schema"]["type"], "object");
}

#[test]
fn responses_request_uses_text_format() {
    let body = build_responses_request("gpt-4o", &sample_request());
    assert_eq!(body["instructions"], "sys");
    assert_eq!(body["max_output_tokens"], 256);
    assert_eq!(body["input"][0]["content"][0]["type"], "input_text");
    assert_eq!(body["text"]["format"]["type"], "json_schema");
    assert_eq!(body["text"]["format"]["name"], "layout");
}

#[test]
fn parse_chat_completions_text() {
    let raw = json!({
        "id": "chatcmpl_1",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": { "role": "assistant", "content": " {\"placedPieces\":[]} " }
        }],
        "usage": { "prompt_tokens": 11, "completion_tokens": 7 }
    })
    .to_string();

    let resp = parse_chat_completions_response(&raw).unwrap();
    assert_eq!(resp.text, "{\"placedPieces\":[]}");
    assert_eq!(resp.model, "gpt-4o-mini");
    assert_eq!(resp.stop_reason, "stop");
    assert_eq!(resp.input_tokens, 11);
    assert_eq!(resp.output_tokens, 7);
}

#[test]
fn parse_chat_completions_missing_choices_errors() {
    let err = parse_chat_completions_response(r#"{"model":"gpt"}"#).unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[test]
fn parse_chat_completions_null_content_is_empty() {
    let raw = json!({
        "choices": [{ "finish_reason": "length", "message": { "role": "assistant", "content": null } }]
    })
    .to_string();
    let err = parse_chat_completions_response(&raw).unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse { ref stop_reason } if stop_reason == "length"));
}

#[test]
fn parse_responses_output_text() {
    let raw = json!({
        "id": "resp_1",
        "model": "gpt-4.1-mini",
        "status": "completed",
        "output": [
            { "type": "reasoning", "summary": [] },
            {
                "type": "message",
                "role": "assistant",
                "content": [{ "type": "output_text", "text": "{\"unplacedPieces\":[]}" }]
            }
        ],
        "usage": { "input_tokens": 21, "output_tokens": 9 }
    })
    .to_string();

    let resp = parse_responses_response(&raw).unwrap();
    assert_eq!(resp.text, "{\"unplacedPieces\":[]}");
    assert_eq!(resp.model, "gpt-4.1-mini");
    assert_eq!(resp.stop_reason, "completed");
    assert_eq!(resp.input_tokens, 21);
    assert_eq!(resp.output_tokens, 9);
}

#[test]
fn parse_responses_without_output_errors() {
    let err = parse_responses_response(r#"{"status":"failed"}"#).unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[test]
fn parse_responses_refusal_is_empty() {
    let raw = json!({
        "status": "completed",
        "output": [{ "type": "message", "content": [{ "type": "refusal", "refusal": "no" }] }]
    })
    .to_string();
    assert!(matches!(parse_responses_response(&raw), Err(LlmError::EmptyResponse { .. })));
}
