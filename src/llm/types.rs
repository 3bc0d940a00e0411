//! LLM types: provider-neutral request/response types and errors.
//!
//! Every call is a single-turn structured generation: a system instruction,
//! one user prompt and a JSON schema the answer must follow.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Failures talking to a text-generation provider.
///
/// `ApiRequest` covers transport problems (DNS, TLS, timeouts); a provider
/// that answered with a non-2xx status is `ApiResponse`.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("invalid LLM setting: {0}")]
    ConfigParse(String),
    #[error("no API key: {var} is unset or blank")]
    MissingApiKey { var: String },
    #[error("provider unreachable: {0}")]
    ApiRequest(String),
    #[error("provider returned HTTP {status}")]
    ApiResponse { status: u16, body: String },
    #[error("unreadable provider response: {0}")]
    ApiParse(String),
    #[error("provider returned no structured output (stop reason: {stop_reason})")]
    EmptyResponse { stop_reason: String },
    #[error("could not build HTTP client: {0}")]
    HttpClientBuild(String),
}

/// Statuses worth retrying later: rate limiting and provider-side failures.
fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::EmptyResponse { .. } => "E_EMPTY_RESPONSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::ApiRequest(_) => true,
            Self::ApiResponse { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// A named JSON schema the provider must constrain its answer to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub description: String,
    pub schema: serde_json::Value,
}

/// Single-turn structured generation request.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub schema: ResponseSchema,
}

/// What the provider sent back, reduced to the parts callers use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// JSON text produced under the requested schema.
    pub text: String,
    pub model: String,
    pub stop_reason: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// CHAT TRAIT
// =============================================================================

/// Structured generation against whichever provider is configured.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// Run one request and return the provider's JSON text.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx statuses and answers without structured
    /// output all surface as [`LlmError`].
    async fn chat(&self, request: &StructuredRequest) -> Result<ChatResponse, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
