use serde::{Deserialize, Serialize};

/// One roster entry from `GET /sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    /// Last-activity timestamp, display-only. Absent for sessions the
    /// backend has not recorded a message for yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_time: Option<String>,
}

impl SessionRecord {
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            last_time: None,
        }
    }
}

/// Response body of `POST /sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session_id: String,
}

/// One persisted message from `GET /sessions/{id}/messages`.
///
/// `role` is kept as the server sent it; callers decide which roles they
/// admit. `id` and `created_at` are only present on server-persisted rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Request body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurnRequest {
    pub session_id: String,
    pub message: String,
}

/// Response body of `POST /chat`. Exactly one assistant reply per turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Diagnostic tool-call record, owned by the backend and never interpreted
/// on this side.
pub type ToolCallRecord = serde_json::Value;
