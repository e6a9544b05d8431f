use std::sync::Arc;

use crate::backend::ChatTransport;
use crate::config::{EnvConfig, DEFAULT_BACKEND_ID};

mod desk;
mod mock;

pub use desk::DeskTransport;
pub use mock::MockTransport;

pub const MOCK_BACKEND_ID: &str = "mock";

/// Resolves the configured transport: the HTTP backend by default, the
/// deterministic in-memory mock for local runs and demos.
pub fn transport_from_config(config: &EnvConfig) -> Result<Arc<dyn ChatTransport>, String> {
    match config.backend_id.as_str() {
        DEFAULT_BACKEND_ID => Ok(Arc::new(DeskTransport::new(
            config.base_url.as_deref(),
            config.timeout,
        )?)),
        MOCK_BACKEND_ID => Ok(Arc::new(MockTransport::default())),
        unknown => Err(format!(
            "Unsupported backend '{unknown}'. Available backends: {DEFAULT_BACKEND_ID}, {MOCK_BACKEND_ID}"
        )),
    }
}
