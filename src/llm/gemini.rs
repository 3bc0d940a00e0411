//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper for `/models/{model}:generateContent` with JSON-mode
//! output. Gemini's schema dialect spells type names in upper case, so the
//! provider-neutral schema is rewritten by [`to_gemini_schema`] before
//! sending. Pure parsing in `parse_response` for testability.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::LlmTimeouts;
use super::types::{ChatResponse, LlmError, StructuredRequest};

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    pub async fn chat(&self, model: &str, request: &StructuredRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let body = build_request(request);

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
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

        parse_response(&text, model)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    system_instruction: ApiContent<'a>,
    contents: Vec<ApiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct ApiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<ApiPart<'a>>,
}

#[derive(Serialize)]
struct ApiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    response_mime_type: &'static str,
    response_schema: Value,
}

fn build_request(request: &StructuredRequest) -> ApiRequest<'_> {
    ApiRequest {
        system_instruction: ApiContent { role: None, parts: vec![ApiPart { text: &request.system }] },
        contents: vec![ApiContent { role: Some("user"), parts: vec![ApiPart { text: &request.prompt }] }],
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            response_mime_type: "application/json",
            response_schema: to_gemini_schema(&request.schema.schema),
        },
    }
}

/// Rewrite JSON-schema `type` names into Gemini's upper-case enum spelling.
pub(crate) fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                let converted = match (key.as_str(), value) {
                    ("type", Value::String(name)) => Value::String(name.to_ascii_uppercase()),
                    ("additionalProperties", _) => continue,
                    _ => to_gemini_schema(value),
                };
                out.insert(key.clone(), converted);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str, requested_model: &str) -> Result<ChatResponse, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(candidate) = api.candidates.into_iter().next() else {
        return Err(LlmError::ApiParse("generateContent: missing candidates[0]".to_string()));
    };
    let stop_reason = candidate.finish_reason.unwrap_or_else(|| "STOP".to_string());
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse { stop_reason });
    }

    let (input_tokens, output_tokens) = api
        .usage_metadata
        .map_or((0, 0), |u| (u.prompt_token_count, u.candidates_token_count));

    Ok(ChatResponse {
        text: text.trim().to_string(),
        model: api.model_version.unwrap_or_else(|| requested_model.to_string()),
        stop_reason,
        input_tokens,
        output_tokens,
    })
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
