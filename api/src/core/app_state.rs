use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use corpus_index::{CorpusIndex, IndexConfig, build_embedder, load_corpus};
use tracing::info;
use tutor_flow::{
    FlowConfig, LlmRephraseGateway, RephraseGateway, TurnController, UnavailableGateway,
};

use crate::error_handler::AppResult;

/// Shared state for all HTTP handlers.
///
/// Built once at startup; nothing in it changes per request.
pub struct AppState {
    /// Dialogue engine (owns the corpus index and the gateway).
    pub controller: TurnController,
    /// LLM profiles, if `LLM_KIND` is configured.
    pub llm: Option<Arc<LlmServiceProfiles>>,
}

impl AppState {
    pub fn new(controller: TurnController, llm: Option<Arc<LlmServiceProfiles>>) -> Self {
        Self { controller, llm }
    }

    /// Loads the corpus, builds the index and wires the gateway from
    /// environment variables.
    pub async fn from_env() -> AppResult<Self> {
        let llm = LlmServiceProfiles::from_env()?.map(Arc::new);

        let index_cfg = IndexConfig::from_env()?;
        let entries = load_corpus(&index_cfg.corpus_path)?;
        let embedder = build_embedder(&index_cfg, llm.clone())?;
        let index = Arc::new(CorpusIndex::build(entries, embedder, index_cfg.concurrency).await?);

        let gateway: Arc<dyn RephraseGateway> = match &llm {
            Some(svc) => Arc::new(LlmRephraseGateway::new(svc.clone())),
            None => Arc::new(UnavailableGateway),
        };

        let flow_cfg = FlowConfig::from_env()?;
        let controller = TurnController::from_config(index, gateway, &flow_cfg)?;

        info!(
            corpus = controller.index().len(),
            embedder = controller.index().embedder_name(),
            gateway = controller.gateway_name(),
            rephrase_timeout_secs = flow_cfg.rephrase_timeout.as_secs(),
            "app state ready"
        );
        Ok(Self::new(controller, llm))
    }
}
