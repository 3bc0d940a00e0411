//! LLM configuration parsed from environment variables.

use std::str::FromStr;

use super::types::LlmError;
use crate::config::env_var;

pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Which provider API the client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProviderKind {
    #[default]
    Gemini,
    Anthropic,
    OpenAi,
}

impl LlmProviderKind {
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::Anthropic => "claude-sonnet-4-5-20250929",
            Self::OpenAi => "gpt-4o",
        }
    }

    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_BASE_URL,
            Self::Anthropic => DEFAULT_ANTHROPIC_BASE_URL,
            Self::OpenAi => DEFAULT_OPENAI_BASE_URL,
        }
    }
}

impl FromStr for LlmProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(Self::Gemini),
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => Err(LlmError::ConfigParse(format!(
                "unknown LLM_PROVIDER '{other}' (expected gemini, anthropic or openai)"
            ))),
        }
    }
}

/// `OpenAI` endpoint family used for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenAiApiMode {
    ChatCompletions,
    #[default]
    Responses,
}

impl FromStr for OpenAiApiMode {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "responses" => Ok(Self::Responses),
            "chat_completions" => Ok(Self::ChatCompletions),
            other => Err(LlmError::ConfigParse(format!(
                "unknown LLM_OPENAI_MODE '{other}' (expected responses or chat_completions)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for LlmTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub openai_mode: OpenAiApiMode,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// - `LLM_PROVIDER`: `gemini` (default), `anthropic` or `openai`
    /// - `LLM_API_KEY_ENV`: names the env var holding the key (default `API_KEY`)
    /// - `LLM_MODEL`: provider default when absent
    /// - `LLM_BASE_URL`: provider default when absent
    /// - `LLM_OPENAI_MODE`: `responses` (default) or `chat_completions`
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown provider or mode, a timeout that is
    /// not a whole number of seconds, or a key variable that is unset or blank.
    pub fn from_env() -> Result<Self, LlmError> {
        let provider = env_or_default::<LlmProviderKind>("LLM_PROVIDER")?;
        let openai_mode = env_or_default::<OpenAiApiMode>("LLM_OPENAI_MODE")?;

        let key_var = env_var("LLM_API_KEY_ENV").unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_owned());
        let Some(api_key) = env_var(&key_var) else {
            return Err(LlmError::MissingApiKey { var: key_var });
        };

        let model = env_var("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_owned());
        let base_url = env_var("LLM_BASE_URL")
            .as_deref()
            .unwrap_or(provider.default_base_url())
            .trim_end_matches('/')
            .to_owned();
        let timeouts = LlmTimeouts {
            request_secs: env_secs("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_secs("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { provider, api_key, model, base_url, openai_mode, timeouts })
    }
}

fn env_or_default<T>(key: &str) -> Result<T, LlmError>
where
    T: FromStr<Err = LlmError> + Default,
{
    env_var(key).map_or_else(|| Ok(T::default()), |raw| raw.trim().parse())
}

fn env_secs(key: &str, default: u64) -> Result<u64, LlmError> {
    match env_var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| LlmError::ConfigParse(format!("{key}='{raw}': {e}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
