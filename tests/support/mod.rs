use desk_chat::app::{FetchSeq, HostOps};

/// Spy host: allocates sequence numbers, records every started fetch, and
/// optionally fails all starts with a fixed error.
#[derive(Default)]
pub struct HostSpy {
    pub next_seq: FetchSeq,
    pub calls: Vec<String>,
    pub fail_with: Option<String>,
    pub render_requests: usize,
    pub stop_requests: usize,
}

impl HostSpy {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn failing(error: &str) -> Self {
        Self {
            fail_with: Some(error.to_string()),
            ..Self::default()
        }
    }

    #[allow(dead_code)]
    pub fn last_seq(&self) -> FetchSeq {
        self.next_seq
    }

    fn allocate(&mut self, call: String) -> Result<FetchSeq, String> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }

        self.calls.push(call);
        self.next_seq += 1;
        Ok(self.next_seq)
    }
}

impl HostOps for HostSpy {
    fn start_roster_fetch(&mut self) -> Result<FetchSeq, String> {
        self.allocate("roster".to_string())
    }

    fn start_session_create(&mut self) -> Result<FetchSeq, String> {
        self.allocate("create".to_string())
    }

    fn start_messages_fetch(&mut self, session_id: &str) -> Result<FetchSeq, String> {
        self.allocate(format!("messages:{session_id}"))
    }

    fn start_chat_turn(&mut self, session_id: &str, text: &str) -> Result<FetchSeq, String> {
        self.allocate(format!("chat:{session_id}:{text}"))
    }

    fn start_tool_calls_fetch(&mut self, session_id: &str) -> Result<FetchSeq, String> {
        self.allocate(format!("tool-calls:{session_id}"))
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn request_stop(&mut self) {
        self.stop_requests += 1;
    }
}
