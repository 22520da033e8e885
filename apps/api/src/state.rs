use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GenerativeModel;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable model backend. Default: the Gemini-backed `LlmClient`.
    pub llm: Arc<dyn GenerativeModel>,
    pub sessions: SessionStore,
    pub config: Config,
}
