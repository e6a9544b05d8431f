//! Transport seam between the synchronizer runtime and the wire.

use desk_api::{MessageRecord, SessionRecord, ToolCallRecord};

/// Blocking five-operation transport contract the runtime runs worker
/// threads against. Implementations must not touch view state; they only
/// produce or consume remote state. Errors are plain strings at this seam;
/// the synchronizer treats every failure identically.
pub trait ChatTransport: Send + Sync + 'static {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>, String>;

    /// Result must contain a usable session identifier.
    fn create_session(&self) -> Result<SessionRecord, String>;

    fn fetch_messages(&self, session_id: &str) -> Result<Vec<MessageRecord>, String>;

    /// Exactly one assistant reply per call.
    fn send_chat_turn(&self, session_id: &str, message: &str) -> Result<String, String>;

    fn fetch_tool_calls(&self, session_id: &str) -> Result<Vec<ToolCallRecord>, String>;
}
