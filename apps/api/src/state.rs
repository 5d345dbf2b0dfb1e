use std::sync::Arc;

use crate::config::Config;
use crate::interview::controller::TurnController;
use crate::interview::session::SessionStore;
use crate::llm_client::ChatModel;
use crate::scraping::fetch::PageFetcher;
use crate::speech::SpeechIo;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Chat model used by interview turns, the coach chat and résumé analysis. Default: `LlmClient`.
    pub llm: Arc<dyn ChatModel>,
    pub speech: Arc<SpeechIo>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub controller: TurnController,
    pub config: Config,
}
