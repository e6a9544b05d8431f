//! Environment configuration, read once at startup.

use std::env;
use std::time::Duration;

pub const BACKEND_ENV_VAR: &str = "DESK_CHAT_BACKEND";
pub const BASE_URL_ENV_VAR: &str = "DESK_CHAT_BASE_URL";
pub const TIMEOUT_ENV_VAR: &str = "DESK_CHAT_TIMEOUT_SEC";

pub const DEFAULT_BACKEND_ID: &str = "http";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Transport selection: `http` (default) or `mock`.
    pub backend_id: String,
    /// Backend base URL; `None` lets the transport fall back to its default.
    pub base_url: Option<String>,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            backend_id: env_string_opt(BACKEND_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_BACKEND_ID.to_string()),
            base_url: env_string_opt(BASE_URL_ENV_VAR),
            timeout: env_timeout(TIMEOUT_ENV_VAR)?,
        })
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_timeout(key: &str) -> Result<Option<Duration>, String> {
    let Some(raw) = env_string_opt(key) else {
        return Ok(None);
    };

    match raw.parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Some(Duration::from_secs(seconds))),
        _ => Err(format!("{key} must be a positive integer, got '{raw}'")),
    }
}
