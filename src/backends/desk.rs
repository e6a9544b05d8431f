use std::time::Duration;

use desk_api::{DeskApiClient, DeskApiConfig, MessageRecord, SessionRecord, ToolCallRecord};

use crate::backend::ChatTransport;

/// HTTP transport backed by [`desk_api`].
///
/// The client is async; workers are plain threads, so each call enters a
/// fresh current-thread tokio runtime and blocks on the request.
pub struct DeskTransport {
    client: DeskApiClient,
}

impl DeskTransport {
    pub fn new(base_url: Option<&str>, timeout: Option<Duration>) -> Result<Self, String> {
        let mut config = DeskApiConfig::new(base_url.unwrap_or_default());
        if let Some(timeout) = timeout {
            config = config.with_timeout(timeout);
        }

        let client = DeskApiClient::new(config)
            .map_err(|error| format!("Failed to initialize desk API transport: {error}"))?;

        Ok(Self { client })
    }

    fn block_on<T>(
        &self,
        future: impl std::future::Future<Output = Result<T, desk_api::DeskApiError>>,
    ) -> Result<T, String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| format!("failed to initialize tokio runtime: {error}"))?;

        runtime.block_on(future).map_err(|error| error.to_string())
    }
}

impl ChatTransport for DeskTransport {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>, String> {
        self.block_on(self.client.list_sessions())
    }

    fn create_session(&self) -> Result<SessionRecord, String> {
        let created = self.block_on(self.client.create_session())?;
        Ok(SessionRecord::new(created.session_id))
    }

    fn fetch_messages(&self, session_id: &str) -> Result<Vec<MessageRecord>, String> {
        self.block_on(self.client.get_messages(session_id))
    }

    fn send_chat_turn(&self, session_id: &str, message: &str) -> Result<String, String> {
        let reply = self.block_on(self.client.send_chat_turn(session_id, message))?;
        Ok(reply.reply)
    }

    fn fetch_tool_calls(&self, session_id: &str) -> Result<Vec<ToolCallRecord>, String> {
        self.block_on(self.client.get_tool_calls(session_id))
    }
}
