//! OpenAI-compatible API client.
//!
//! Supports both `/chat/completions` (`response_format: json_schema`) and
//! `/responses` (`text.format: json_schema`) for structured output.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};

use super::config::{LlmTimeouts, OpenAiApiMode};
use super::types::{ChatResponse, LlmError, StructuredRequest};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    mode: OpenAiApiMode,
}

impl OpenAiClient {
    pub fn new(api_key: String, mode: OpenAiApiMode, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url, mode })
    }

    pub async fn chat(&self, model: &str, request: &StructuredRequest) -> Result<ChatResponse, LlmError> {
        match self.mode {
            OpenAiApiMode::ChatCompletions => {
                let body = build_chat_completions_request(model, request);
                let text = self.send_json("/chat/completions", &body).await?;
                parse_chat_completions_response(&text)
            }
            OpenAiApiMode::Responses => {
                let body = build_responses_request(model, request);
                let text = self.send_json("/responses", &body).await?;
                parse_responses_response(&text)
            }
        }
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }
        Ok(text)
    }
}

// =============================================================================
// REQUEST BUILDERS
// =============================================================================

fn build_chat_completions_request(model: &str, request: &StructuredRequest) -> Value {
    let schema = &request.schema;
    json!({
        "model": model,
        "max_tokens": request.max_tokens,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.prompt },
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "description": schema.description,
                "schema": schema.schema,
                "strict": true,
            },
        },
    })
}

fn build_responses_request(model: &str, request: &StructuredRequest) -> Value {
    let schema = &request.schema;
    json!({
        "model": model,
        "max_output_tokens": request.max_tokens,
        "instructions": request.system,
        "input": [{
            "type": "message",
            "role": "user",
            "content": [{ "type": "input_text", "text": request.prompt }],
        }],
        "text": {
            "format": {
                "type": "json_schema",
                "name": schema.name,
                "description": schema.description,
                "schema": schema.schema,
                "strict": true,
            },
        },
    })
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

fn usage(root: &Value, input_key: &str, output_key: &str) -> (u64, u64) {
    let read = |key: &str| {
        root.get("usage")
            .and_then(|u| u.get(key))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    };
    (read(input_key), read(output_key))
}

fn model_name(root: &Value) -> String {
    root.get("model")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let (input_tokens, output_tokens) = usage(&root, "prompt_tokens", "completion_tokens");

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };
    let stop_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .unwrap_or("stop")
        .to_string();
    let text = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    if text.is_empty() {
        return Err(LlmError::EmptyResponse { stop_reason });
    }

    Ok(ChatResponse { text, model: model_name(&root), stop_reason, input_tokens, output_tokens })
}

pub(crate) fn parse_responses_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let (input_tokens, output_tokens) = usage(&root, "input_tokens", "output_tokens");
    let stop_reason = root
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("completed")
        .to_string();

    let Some(output) = root.get("output").and_then(Value::as_array) else {
        return Err(LlmError::ApiParse("responses: missing output".to_string()));
    };

    let mut text = String::new();
    for item in output {
        if item.get("type").and_then(Value::as_str) != Some("message") {
            continue;
        }
        let Some(parts) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in parts {
            if part.get("type").and_then(Value::as_str) == Some("output_text") {
                if let Some(t) = part.get("text").and_then(Value::as_str) {
                    text.push_str(t);
                }
            }
        }
    }

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse { stop_reason });
    }

    Ok(ChatResponse { text, model: model_name(&root), stop_reason, input_tokens, output_tokens })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
