use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use desk_api::{MessageRecord, SessionRecord, ToolCallRecord};
use serde_json::json;

use crate::backend::ChatTransport;

const CANNED_REPLIES: [&str; 4] = [
    "Checked the catalog; that title is on the shelf.",
    "Restocked and logged the inventory change.",
    "Here is what the catalog shows for that author.",
    "Order placed with the usual supplier.",
];

const SEED_SYSTEM_PROMPT: &str =
    "You are the library desk agent. Answer questions about books, restocking, and orders.";

/// Deterministic in-memory backend for local runs and tests.
///
/// Behaves like the real server at the contract level: sessions are
/// created explicitly, every chat turn persists a user and an assistant
/// row plus one tool-call record, and unknown session ids fail.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    next_session: usize,
    next_message_id: i64,
    turn_count: usize,
    sessions: Vec<SessionRecord>,
    messages: HashMap<String, Vec<MessageRecord>>,
    tool_calls: HashMap<String, Vec<ToolCallRecord>>,
}

impl MockState {
    fn record_message(&mut self, session_id: &str, role: &str, content: &str) {
        self.next_message_id += 1;
        let row = MessageRecord {
            role: role.to_string(),
            content: content.to_string(),
            id: Some(self.next_message_id),
            created_at: Some(format!("turn {}", self.turn_count)),
        };
        self.messages
            .entry(session_id.to_string())
            .or_default()
            .push(row);
    }
}

impl ChatTransport for MockTransport {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>, String> {
        Ok(lock_unpoisoned(&self.state).sessions.clone())
    }

    fn create_session(&self) -> Result<SessionRecord, String> {
        let mut state = lock_unpoisoned(&self.state);
        state.next_session += 1;
        let session = SessionRecord::new(format!("local-{}", state.next_session));

        state.sessions.insert(0, session.clone());
        let session_id = session.session_id.clone();
        state.record_message(&session_id, "system", SEED_SYSTEM_PROMPT);

        Ok(session)
    }

    fn fetch_messages(&self, session_id: &str) -> Result<Vec<MessageRecord>, String> {
        let state = lock_unpoisoned(&self.state);
        state
            .messages
            .get(session_id)
            .cloned()
            .ok_or_else(|| format!("unknown session '{session_id}'"))
    }

    fn send_chat_turn(&self, session_id: &str, message: &str) -> Result<String, String> {
        let mut state = lock_unpoisoned(&self.state);
        if !state.messages.contains_key(session_id) {
            return Err(format!("unknown session '{session_id}'"));
        }

        state.turn_count += 1;
        let turn = state.turn_count;
        let reply = CANNED_REPLIES[(turn - 1) % CANNED_REPLIES.len()].to_string();

        state.record_message(session_id, "user", message);
        state.record_message(session_id, "assistant", &reply);

        state.tool_calls.entry(session_id.to_string()).or_default().push(json!({
            "id": turn,
            "name": "search_catalog",
            "args_json": json!({ "query": message }).to_string(),
            "result_json": json!({ "matches": 1 }).to_string(),
            "created_at": format!("turn {turn}"),
        }));

        if let Some(session) = state
            .sessions
            .iter_mut()
            .find(|session| session.session_id == session_id)
        {
            session.last_time = Some(format!("turn {turn}"));
        }

        Ok(reply)
    }

    fn fetch_tool_calls(&self, session_id: &str) -> Result<Vec<ToolCallRecord>, String> {
        let state = lock_unpoisoned(&self.state);
        if !state.messages.contains_key(session_id) {
            return Err(format!("unknown session '{session_id}'"));
        }

        Ok(state
            .tool_calls
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
