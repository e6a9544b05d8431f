use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeskApiError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("failed to construct HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {endpoint}: {message}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        message: String,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl DeskApiError {
    #[must_use]
    pub fn request(endpoint: &'static str, source: reqwest::Error) -> Self {
        Self::Request { endpoint, source }
    }

    #[must_use]
    pub fn status(endpoint: &'static str, status: StatusCode, body: &str) -> Self {
        Self::Status {
            endpoint,
            status,
            message: parse_error_detail(status, body),
        }
    }

    #[must_use]
    pub fn decode(endpoint: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { endpoint, source }
    }
}

/// Extract a human-readable message from an error response body.
///
/// The backend reports failures as `{"detail": ...}` where `detail` is
/// usually a string but may be any JSON value (validation failures arrive as
/// arrays). Non-JSON bodies are passed through; empty bodies fall back to
/// the status line reason.
pub fn parse_error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail") {
            return match detail {
                serde_json::Value::String(message) if !message.is_empty() => message.clone(),
                serde_json::Value::Null => fallback_reason(status, body),
                other => other.to_string(),
            };
        }
    }

    fallback_reason(status, body)
}

fn fallback_reason(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
