//! LLM: multi-provider adapter for structured JSON generation.
//!
//! DESIGN
//! ======
//! Configured from environment variables. The `LlmClient` dispatches to
//! Gemini, Anthropic or `OpenAI` based on `LLM_PROVIDER`; callers depend on
//! the [`LlmChat`] trait so tests can substitute a mock.

pub mod anthropic;
pub mod config;
pub mod gemini;
pub mod openai;
pub mod types;

use config::{LlmConfig, LlmProviderKind};
pub use types::LlmChat;
use types::{ChatResponse, LlmError, StructuredRequest};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// One configured provider plus the model every request is sent to.
pub struct LlmClient {
    backend: Backend,
    model: String,
}

enum Backend {
    Gemini(gemini::GeminiClient),
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl Backend {
    fn build(config: LlmConfig) -> Result<Self, LlmError> {
        let LlmConfig { provider, api_key, base_url, openai_mode, timeouts, .. } = config;
        Ok(match provider {
            LlmProviderKind::Gemini => Self::Gemini(gemini::GeminiClient::new(api_key, base_url, timeouts)?),
            LlmProviderKind::Anthropic => Self::Anthropic(anthropic::AnthropicClient::new(api_key, base_url, timeouts)?),
            LlmProviderKind::OpenAi => Self::OpenAi(openai::OpenAiClient::new(api_key, openai_mode, base_url, timeouts)?),
        })
    }
}

impl LlmClient {
    /// Read [`LlmConfig`] from the environment and build the matching client.
    ///
    /// # Errors
    ///
    /// Fails on a missing API key or an unparseable variable, and when the HTTP
    /// client cannot be built.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_config(LlmConfig::from_env()?)
    }

    /// # Errors
    ///
    /// Fails when the provider's HTTP client cannot be built.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let model = config.model.clone();
        Ok(Self { backend: Backend::build(config)?, model })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, request: &StructuredRequest) -> Result<ChatResponse, LlmError> {
        let model = self.model.as_str();
        match &self.backend {
            Backend::Gemini(client) => client.chat(model, request).await,
            Backend::Anthropic(client) => client.chat(model, request).await,
            Backend::OpenAi(client) => client.chat(model, request).await,
        }
    }
}
