use desk_api::{MessageRecord, SessionRecord, ToolCallRecord};

use crate::commands::{parse_slash_command, SlashCommand};

/// Identifier for one started fetch, allocated by the host.
pub type FetchSeq = u64;

/// Remote operation a fetch belongs to. Used to route completion and
/// failure events back into the right slot of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOp {
    Roster,
    CreateSession,
    Messages,
    ChatTurn,
    ToolCalls,
}

impl FetchOp {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Roster => "Session list",
            Self::CreateSession => "Create session",
            Self::Messages => "Message history",
            Self::ChatTurn => "Chat turn",
            Self::ToolCalls => "Tool calls",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the visible message log.
///
/// `pending` marks the optimistic echo of a just-sent user message: no
/// server id, no timestamp, not yet confirmed by a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub id: Option<i64>,
    pub created_at: Option<String>,
    pub pending: bool,
}

impl ChatMessage {
    #[must_use]
    pub fn echo(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            id: None,
            created_at: None,
            pending: true,
        }
    }

    /// Converts a server row into a log entry. Only `user` and `assistant`
    /// roles enter the log; `system` rows (and anything else the backend
    /// might emit) are dropped.
    #[must_use]
    pub fn from_record(record: MessageRecord) -> Option<Self> {
        let role = match record.role.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => return None,
        };

        Some(Self {
            role,
            content: record.content,
            id: record.id,
            created_at: record.created_at,
            pending: false,
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct InputHistory {
    entries: Vec<String>,
    cursor: Option<usize>,
    draft: Option<String>,
}

impl InputHistory {
    fn record_entry(&mut self, text: String) {
        self.entries.push(text);
        self.reset_navigation();
    }

    fn reset_navigation(&mut self) {
        self.cursor = None;
        self.draft = None;
    }

    fn previous(&mut self, current_input: &str) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }

        if self.cursor.is_some_and(|index| index >= self.entries.len()) {
            self.cursor = None;
        }

        let next_cursor = match self.cursor {
            None => {
                self.draft = Some(current_input.to_string());
                self.entries.len() - 1
            }
            Some(index) => index.saturating_sub(1),
        };

        self.cursor = Some(next_cursor);
        Some(self.entries[next_cursor].clone())
    }

    fn next(&mut self) -> Option<String> {
        let current = self.cursor?;

        if current + 1 >= self.entries.len() {
            self.cursor = None;
            return Some(self.draft.take().unwrap_or_default());
        }

        self.cursor = Some(current + 1);
        Some(self.entries[current + 1].clone())
    }
}

/// A fetch scoped to one session. Results only apply when the seq is still
/// the latest for its slot and the session is still the active one.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TargetFetch {
    seq: FetchSeq,
    session_id: String,
}

/// Latest outstanding fetch per target. "Last issued wins": a completion
/// whose seq no longer matches its slot is discarded, never applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct FetchLedger {
    roster: Option<FetchSeq>,
    create: Option<FetchSeq>,
    messages: Option<TargetFetch>,
    tool_calls: Option<TargetFetch>,
}

/// One in-flight chat turn. Turns are tracked individually so overlapping
/// sends resolve independently; replies append in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingTurn {
    seq: FetchSeq,
    session_id: String,
    text: String,
}

/// View state for the desk chat client.
///
/// Action handlers mutate synchronously and start remote work through
/// [`HostOps`]; `on_*_loaded`/`on_fetch_failed` apply completions delivered
/// by the runtime. The struct itself never touches the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub roster: Vec<SessionRecord>,
    pub active_session_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub tool_trace_visible: bool,
    pub tool_trace: Vec<ToolCallRecord>,
    pub composer: String,
    /// Transient status-line banner, mostly failure feedback. Cleared at
    /// the start of the next user action.
    pub notice: Option<String>,
    pub should_exit: bool,
    history: InputHistory,
    ledger: FetchLedger,
    pending_turns: Vec<PendingTurn>,
}

/// Host side effects available to action handlers. The runtime implements
/// this over worker threads; tests implement it with spies.
pub trait HostOps {
    fn start_roster_fetch(&mut self) -> Result<FetchSeq, String>;
    fn start_session_create(&mut self) -> Result<FetchSeq, String>;
    fn start_messages_fetch(&mut self, session_id: &str) -> Result<FetchSeq, String>;
    fn start_chat_turn(&mut self, session_id: &str, text: &str) -> Result<FetchSeq, String>;
    fn start_tool_calls_fetch(&mut self, session_id: &str) -> Result<FetchSeq, String>;
    fn request_render(&mut self);
    fn request_stop(&mut self);
}

const HELP_TEXT: &str = "Commands: /help, /new, /refresh, /tools, /quit";

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            roster: Vec::new(),
            active_session_id: None,
            messages: Vec::new(),
            tool_trace_visible: false,
            tool_trace: Vec::new(),
            composer: String::new(),
            notice: None,
            should_exit: false,
            history: InputHistory::default(),
            ledger: FetchLedger::default(),
            pending_turns: Vec::new(),
        }
    }

    /// True while a messages fetch for the active session is outstanding.
    #[must_use]
    pub fn is_loading_messages(&self) -> bool {
        self.ledger.messages.is_some()
    }

    /// Number of chat turns still waiting for a reply.
    #[must_use]
    pub fn pending_turn_count(&self) -> usize {
        self.pending_turns.len()
    }

    /// Returns submitted prompt history in chronological order.
    #[must_use]
    pub fn history_entries(&self) -> &[String] {
        &self.history.entries
    }

    // --- composer editing -------------------------------------------------

    pub fn on_composer_replace(&mut self, text: String) {
        self.composer = text;
        self.history.reset_navigation();
    }

    pub fn on_composer_char(&mut self, ch: char) {
        self.composer.push(ch);
        self.history.reset_navigation();
    }

    pub fn on_composer_backspace(&mut self) {
        self.composer.pop();
        self.history.reset_navigation();
    }

    /// Moves to the previous history entry and replaces the composer when possible.
    pub fn on_history_previous(&mut self) {
        if let Some(previous) = self.history.previous(&self.composer) {
            self.composer = previous;
        }
    }

    /// Moves to the next history entry (or the saved draft) when possible.
    pub fn on_history_next(&mut self) {
        if let Some(next) = self.history.next() {
            self.composer = next;
        }
    }

    // --- user actions -----------------------------------------------------

    pub fn on_refresh_roster(&mut self, host: &mut dyn HostOps) {
        self.notice = None;
        match host.start_roster_fetch() {
            Ok(seq) => self.ledger.roster = Some(seq),
            Err(error) => self.notice = Some(format!("Failed to refresh sessions: {error}")),
        }
        host.request_render();
    }

    pub fn on_select_session(&mut self, host: &mut dyn HostOps, session_id: &str) {
        self.notice = None;
        self.active_session_id = Some(session_id.to_string());
        // The log always belongs to the active session: clear it in the
        // same step that switches the id, fill it when the fetch settles.
        self.messages.clear();
        self.tool_trace.clear();

        match host.start_messages_fetch(session_id) {
            Ok(seq) => {
                self.ledger.messages = Some(TargetFetch {
                    seq,
                    session_id: session_id.to_string(),
                });
            }
            Err(error) => {
                self.ledger.messages = None;
                self.notice = Some(format!("Failed to load messages: {error}"));
            }
        }

        if self.tool_trace_visible {
            self.start_tool_trace_fetch(host, session_id);
        } else {
            self.ledger.tool_calls = None;
        }

        host.request_render();
    }

    pub fn on_create_session(&mut self, host: &mut dyn HostOps) {
        self.notice = None;
        match host.start_session_create() {
            Ok(seq) => self.ledger.create = Some(seq),
            Err(error) => self.notice = Some(format!("Failed to create session: {error}")),
        }
        host.request_render();
    }

    /// Flips trace visibility. Never fetches and never touches the trace
    /// data; the panel fills on the next select, reply, or explicit refresh.
    pub fn on_toggle_tool_trace(&mut self, host: &mut dyn HostOps) {
        self.tool_trace_visible = !self.tool_trace_visible;
        host.request_render();
    }

    /// Manual trace refresh for the active session; no-op without one.
    pub fn on_refresh_tool_trace(&mut self, host: &mut dyn HostOps) {
        let Some(session_id) = self.active_session_id.clone() else {
            host.request_render();
            return;
        };

        self.notice = None;
        self.start_tool_trace_fetch(host, &session_id);
        host.request_render();
    }

    pub fn on_submit(&mut self, host: &mut dyn HostOps) {
        let prompt = self.composer.trim().to_string();
        if prompt.is_empty() {
            host.request_render();
            return;
        }

        if let Some(command) = parse_slash_command(&prompt) {
            self.composer.clear();
            self.history.reset_navigation();
            self.run_slash_command(host, command);
            return;
        }

        // Preconditions fail before the composer is cleared: submitting
        // with no active session leaves everything untouched.
        let Some(session_id) = self.active_session_id.clone() else {
            host.request_render();
            return;
        };

        self.notice = None;
        self.composer.clear();
        self.history.record_entry(prompt.clone());
        self.messages.push(ChatMessage::echo(prompt.as_str()));

        match host.start_chat_turn(&session_id, &prompt) {
            Ok(seq) => self.pending_turns.push(PendingTurn {
                seq,
                session_id,
                text: prompt,
            }),
            // The echo stays in the log either way.
            Err(error) => self.notice = Some(format!("Failed to send message: {error}")),
        }

        host.request_render();
    }

    pub fn on_control_c(&mut self, host: &mut dyn HostOps) {
        if !self.composer.is_empty() {
            self.on_composer_replace(String::new());
            host.request_render();
            return;
        }

        self.on_quit(host);
    }

    pub fn on_quit(&mut self, host: &mut dyn HostOps) {
        self.should_exit = true;
        host.request_stop();
        host.request_render();
    }

    fn run_slash_command(&mut self, host: &mut dyn HostOps, command: SlashCommand) {
        match command {
            SlashCommand::Help => {
                self.notice = Some(HELP_TEXT.to_string());
                host.request_render();
            }
            SlashCommand::New => self.on_create_session(host),
            SlashCommand::Refresh => {
                self.on_refresh_roster(host);
                if self.tool_trace_visible {
                    self.on_refresh_tool_trace(host);
                }
            }
            SlashCommand::Tools => self.on_toggle_tool_trace(host),
            SlashCommand::Quit => self.on_quit(host),
            SlashCommand::Unknown(command) => {
                self.notice = Some(format!("Unknown command: {command}"));
                host.request_render();
            }
        }
    }

    fn start_tool_trace_fetch(&mut self, host: &mut dyn HostOps, session_id: &str) {
        match host.start_tool_calls_fetch(session_id) {
            Ok(seq) => {
                self.ledger.tool_calls = Some(TargetFetch {
                    seq,
                    session_id: session_id.to_string(),
                });
            }
            Err(error) => {
                self.ledger.tool_calls = None;
                self.notice = Some(format!("Failed to load tool calls: {error}"));
            }
        }
    }

    // --- fetch completions ------------------------------------------------

    pub fn on_roster_loaded(&mut self, seq: FetchSeq, sessions: Vec<SessionRecord>) {
        if self.ledger.roster != Some(seq) {
            return;
        }

        self.ledger.roster = None;
        // The active id is preserved even when the new roster no longer
        // contains it; only select/create change it.
        self.roster = sessions;
    }

    pub fn on_session_created(
        &mut self,
        host: &mut dyn HostOps,
        seq: FetchSeq,
        session: SessionRecord,
    ) {
        if self.ledger.create != Some(seq) {
            return;
        }

        self.ledger.create = None;
        self.on_refresh_roster(host);
        self.on_select_session(host, &session.session_id);
    }

    pub fn on_messages_loaded(
        &mut self,
        seq: FetchSeq,
        session_id: &str,
        records: Vec<MessageRecord>,
    ) {
        let latest = matches!(
            &self.ledger.messages,
            Some(fetch) if fetch.seq == seq && fetch.session_id == session_id
        );
        if !latest || self.active_session_id.as_deref() != Some(session_id) {
            return;
        }

        self.ledger.messages = None;
        self.messages = records
            .into_iter()
            .filter_map(ChatMessage::from_record)
            .collect();
    }

    pub fn on_reply_received(
        &mut self,
        host: &mut dyn HostOps,
        seq: FetchSeq,
        session_id: &str,
        reply: &str,
    ) {
        let Some(index) = self.pending_turns.iter().position(|turn| turn.seq == seq) else {
            return;
        };
        let turn = self.pending_turns.remove(index);

        // A reply for a session the user has switched away from is
        // discarded; the roster still refreshes since the turn persisted
        // server-side either way.
        if self.active_session_id.as_deref() == Some(session_id) {
            self.confirm_echo(&turn.text);
            self.messages.push(ChatMessage {
                role: Role::Assistant,
                content: reply.to_string(),
                id: None,
                created_at: None,
                pending: false,
            });
        }

        self.on_refresh_roster(host);

        if self.tool_trace_visible {
            if let Some(active) = self.active_session_id.clone() {
                self.start_tool_trace_fetch(host, &active);
            }
        }
    }

    pub fn on_tool_calls_loaded(
        &mut self,
        seq: FetchSeq,
        session_id: &str,
        records: Vec<ToolCallRecord>,
    ) {
        let latest = matches!(
            &self.ledger.tool_calls,
            Some(fetch) if fetch.seq == seq && fetch.session_id == session_id
        );
        if !latest || self.active_session_id.as_deref() != Some(session_id) {
            return;
        }

        self.ledger.tool_calls = None;
        self.tool_trace = records;
    }

    pub fn on_fetch_failed(&mut self, seq: FetchSeq, op: FetchOp, error: &str) {
        let current = match op {
            FetchOp::Roster => self.ledger.roster.take_if(|latest| *latest == seq).is_some(),
            FetchOp::CreateSession => self.ledger.create.take_if(|latest| *latest == seq).is_some(),
            FetchOp::Messages => {
                let matched = matches!(&self.ledger.messages, Some(fetch) if fetch.seq == seq);
                if matched {
                    self.ledger.messages = None;
                }
                matched
            }
            FetchOp::ToolCalls => {
                let matched = matches!(&self.ledger.tool_calls, Some(fetch) if fetch.seq == seq);
                if matched {
                    self.ledger.tool_calls = None;
                }
                matched
            }
            FetchOp::ChatTurn => {
                let position = self.pending_turns.iter().position(|turn| turn.seq == seq);
                // The optimistic echo is never rolled back.
                if let Some(index) = position {
                    self.pending_turns.remove(index);
                }
                position.is_some()
            }
        };

        // Failures of superseded fetches are as stale as their results.
        if !current {
            return;
        }

        self.notice = Some(format!("{} failed: {error}", op.label()));
    }

    fn confirm_echo(&mut self, text: &str) {
        if let Some(echo) = self
            .messages
            .iter_mut()
            .find(|message| message.pending && message.role == Role::User && message.content == text)
        {
            echo.pending = false;
        }
    }
}
