//! Anthropic Messages API client.
//!
//! Thin HTTP wrapper for `/v1/messages`. Structured output is obtained by
//! offering a single tool whose input schema is the response schema and
//! forcing the model to call it; the tool input is the answer. Pure parsing
//! in `parse_response` for testability.

use std::time::Duration;

use serde_json::Value;

use super::config::LlmTimeouts;
use super::types::{ChatResponse, LlmError, StructuredRequest};

const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    pub async fn chat(&self, model: &str, request: &StructuredRequest) -> Result<ChatResponse, LlmError> {
        let body = build_request(model, request);

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
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

        parse_response(&text, &request.schema.name)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [ApiMessage<'a>; 1],
    tools: [ApiTool<'a>; 1],
    tool_choice: ToolChoice<'a>,
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(serde::Serialize)]
struct ApiTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(serde::Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    choice_type: &'static str,
    name: &'a str,
}

fn build_request<'a>(model: &'a str, request: &'a StructuredRequest) -> ApiRequest<'a> {
    let schema = &request.schema;
    ApiRequest {
        model,
        max_tokens: request.max_tokens,
        system: &request.system,
        messages: [ApiMessage { role: "user", content: &request.prompt }],
        tools: [ApiTool { name: &schema.name, description: &schema.description, input_schema: &schema.schema }],
        tool_choice: ToolChoice { choice_type: "tool", name: &schema.name },
    }
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    model: String,
    stop_reason: String,
    usage: Usage,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "tool_use")]
    ToolUse { name: String, input: Value },
    #[serde(other)]
    Unknown,
}

#[derive(serde::Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str, tool_name: &str) -> Result<ChatResponse, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let input = api.content.into_iter().find_map(|block| match block {
        ContentBlock::ToolUse { name, input } if name == tool_name => Some(input),
        _ => None,
    });
    let Some(input) = input else {
        return Err(LlmError::EmptyResponse { stop_reason: api.stop_reason });
    };

    Ok(ChatResponse {
        text: input.to_string(),
        model: api.model,
        stop_reason: api.stop_reason,
        input_tokens: api.usage.input_tokens,
        output_tokens: api.usage.output_tokens,
    })
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
