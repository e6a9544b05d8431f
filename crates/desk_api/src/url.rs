/// Default base URL for the desk agent backend.
///
/// The backend mounts every route under `/api`, so the base URL carries the
/// prefix and endpoint helpers only append route segments.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Normalize a configured base URL.
///
/// Blank input falls back to [`DEFAULT_BASE_URL`]; trailing slashes are
/// stripped so endpoint helpers can join with a single `/`.
pub fn normalize_base_url(input: &str) -> String {
    let base = input.trim();
    if base.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }

    base.trim_end_matches('/').to_string()
}

/// `GET`/`POST {base}/sessions`
pub fn sessions_url(base: &str) -> String {
    format!("{base}/sessions")
}

/// `GET {base}/sessions/{id}/messages`
pub fn messages_url(base: &str, session_id: &str) -> String {
    format!("{base}/sessions/{session_id}/messages")
}

/// `POST {base}/chat`
pub fn chat_url(base: &str) -> String {
    format!("{base}/chat")
}

/// `GET {base}/sessions/{id}/tool-calls`
pub fn tool_calls_url(base: &str, session_id: &str) -> String {
    format!("{base}/sessions/{session_id}/tool-calls")
}
