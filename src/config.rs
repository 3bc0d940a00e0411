//! Server configuration parsed from environment variables.
//!
//! LLM provider settings live in [`crate::llm::config`]; this module covers
//! the server itself and the choice of layout oracle.

use std::path::PathBuf;
use std::str::FromStr;

use crate::oracle::VerifyMode;
use crate::oracle::llm::DEFAULT_LAYOUT_MAX_TOKENS;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HISTORY_DIR: &str = "./data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OracleKind {
    /// Remote LLM (`LAYOUT_ORACLE=llm`).
    #[default]
    Llm,
    /// Offline shelf packer (`LAYOUT_ORACLE=local`).
    Local,
}

impl FromStr for OracleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "llm" => Ok(Self::Llm),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown LAYOUT_ORACLE '{other}' (expected llm or local)")),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        "E_CONFIG"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub history_dir: PathBuf,
    pub oracle: OracleKind,
    pub verify: VerifyMode,
    pub max_tokens: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            history_dir: PathBuf::from(DEFAULT_HISTORY_DIR),
            oracle: OracleKind::default(),
            verify: VerifyMode::default(),
            max_tokens: DEFAULT_LAYOUT_MAX_TOKENS,
        }
    }
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `HISTORY_DIR`: default `./data`
    /// - `LAYOUT_ORACLE`: `llm` (default) or `local`
    /// - `LAYOUT_VERIFY`: `off`, `warn` or `strict` (default)
    /// - `LAYOUT_MAX_TOKENS`: default 8192
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a value that is present but does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            port: env_parse("PORT", defaults.port)?,
            history_dir: env_var("HISTORY_DIR").map_or(defaults.history_dir, PathBuf::from),
            oracle: env_parse("LAYOUT_ORACLE", defaults.oracle)?,
            verify: env_parse("LAYOUT_VERIFY", defaults.verify)?,
            max_tokens: env_parse("LAYOUT_MAX_TOKENS", defaults.max_tokens)?,
        })
    }
}

/// Non-blank value of `key`.
pub(crate) fn env_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Parse `key` when set, `default` when unset or blank.
fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::Invalid { var: key, reason: format!("'{raw}': {e}") }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
