//! Terminal chat client for the library desk agent backend.
//!
//! ## Backend bootstrap
//!
//! The transport is selected at startup:
//!
//! - `DESK_CHAT_BACKEND=http` (default) talks to the desk agent HTTP API;
//!   point `DESK_CHAT_BASE_URL` at the backend's `/api` prefix
//!   (`http://127.0.0.1:8000/api` when unset) and optionally bound request
//!   time with `DESK_CHAT_TIMEOUT_SEC`.
//! - `DESK_CHAT_BACKEND=mock` runs against a deterministic in-memory
//!   backend for local demos and tests.
//!
//! ## State contract
//!
//! `app::App` owns the view state: the session roster, the active session's
//! message log, the optional tool-call trace, and the composer. Remote work
//! runs on worker threads owned by `runtime::SyncController`; completions
//! carry a sequence number and are applied with last-issued-wins guards, so
//! a slow response can never overwrite state set by a later action.
//!
//! The message log is replaced wholesale on every session switch and
//! `system` rows never enter it. A just-sent user message appears
//! immediately as a pending echo and is confirmed when its reply arrives;
//! failed turns keep the echo and surface on the status line.

pub mod app;
pub mod backend;
pub mod backends;
pub mod commands;
pub mod config;
pub mod runtime;
pub mod tui;
