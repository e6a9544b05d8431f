//! Transport-only client primitives for the desk agent HTTP API.
//!
//! This crate owns request building, response parsing, and the error
//! taxonomy for the backend's five endpoints. It intentionally contains no
//! view state and no UI coupling: every operation is a plain request/response
//! round trip whose parsed body is handed back uninterpreted.
//!
//! Contract notes:
//! - The base URL is fixed at configuration time and includes the backend's
//!   `/api` prefix.
//! - There is no retry, timeout-recovery, or cancellation policy here; a
//!   failed call surfaces as a [`DeskApiError`] and nothing else happens.
//! - Error response bodies follow the backend's `{"detail": ...}` shape.

pub mod client;
pub mod config;
pub mod error;
pub mod types;
pub mod url;

pub use client::DeskApiClient;
pub use config::DeskApiConfig;
pub use error::DeskApiError;
pub use types::{ChatReply, ChatTurnRequest, CreatedSession, MessageRecord, SessionRecord, ToolCallRecord};
pub use url::{normalize_base_url, DEFAULT_BASE_URL};
