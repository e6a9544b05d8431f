use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::DeskApiConfig;
use crate::error::DeskApiError;
use crate::types::{
    ChatReply, ChatTurnRequest, CreatedSession, MessageRecord, SessionRecord, ToolCallRecord,
};
use crate::url::{chat_url, messages_url, normalize_base_url, sessions_url, tool_calls_url};

/// HTTP client for the five desk agent endpoints.
///
/// Each call is a single request/response round trip: no retries, no
/// streaming, no caching. Bodies are returned parsed but uninterpreted.
#[derive(Debug)]
pub struct DeskApiClient {
    http: Client,
    config: DeskApiConfig,
    base_url: String,
}

impl DeskApiClient {
    pub fn new(config: DeskApiConfig) -> Result<Self, DeskApiError> {
        let base_url = normalize_base_url(&config.base_url);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(DeskApiError::InvalidBaseUrl(base_url));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = config.user_agent.as_deref() {
            builder = builder.user_agent(user_agent.to_string());
        }
        let http = builder
            .build()
            .map_err(|source| DeskApiError::ClientBuild { source })?;

        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &DeskApiConfig {
        &self.config
    }

    /// Normalized base URL every endpoint is joined onto.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionRecord>, DeskApiError> {
        let endpoint = "list sessions";
        let request = self.http.get(sessions_url(&self.base_url));
        self.execute(endpoint, request).await
    }

    pub async fn create_session(&self) -> Result<CreatedSession, DeskApiError> {
        let endpoint = "create session";
        let request = self.http.post(sessions_url(&self.base_url));
        self.execute(endpoint, request).await
    }

    pub async fn get_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<MessageRecord>, DeskApiError> {
        let endpoint = "get messages";
        let request = self.http.get(messages_url(&self.base_url, session_id));
        self.execute(endpoint, request).await
    }

    pub async fn send_chat_turn(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<ChatReply, DeskApiError> {
        let endpoint = "chat turn";
        let body = ChatTurnRequest {
            session_id: session_id.to_string(),
            message: message.to_string(),
        };
        let request = self.http.post(chat_url(&self.base_url)).json(&body);
        self.execute(endpoint, request).await
    }

    pub async fn get_tool_calls(
        &self,
        session_id: &str,
    ) -> Result<Vec<ToolCallRecord>, DeskApiError> {
        let endpoint = "get tool calls";
        let request = self.http.get(tool_calls_url(&self.base_url, session_id));
        self.execute(endpoint, request).await
    }

    /// Send one request and parse the success body.
    ///
    /// Non-2xx responses read the body for the backend's `detail` message;
    /// success bodies are read as text first so decode failures keep the
    /// endpoint context instead of vanishing into a generic reqwest error.
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, DeskApiError> {
        let response = request
            .send()
            .await
            .map_err(|source| DeskApiError::request(endpoint, source))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| DeskApiError::request(endpoint, source))?;

        if !status.is_success() {
            return Err(DeskApiError::status(endpoint, status, &body));
        }

        serde_json::from_str(&body).map_err(|source| DeskApiError::decode(endpoint, source))
    }
}
