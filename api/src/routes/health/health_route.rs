//! `GET /health`: corpus summary and LLM reachability.

use std::sync::Arc;

use ai_llm_service::HealthStatus;
use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub corpus_size: usize,
    pub index_dim: usize,
    pub embedder: String,
    pub gateway: String,
    /// One entry per distinct LLM profile; empty without an LLM.
    pub llm: Vec<HealthStatus>,
}

/// Handler: GET /health. Always 200; probe failures show up in `llm[].ok`.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthReport>> {
    let index = state.controller.index();
    let llm = match &state.llm {
        Some(svc) => svc.health_all().await,
        None => Vec::new(),
    };

    Json(ApiResponse::success(HealthReport {
        corpus_size: index.len(),
        index_dim: index.dim(),
        embedder: index.embedder_name().to_string(),
        gateway: state.controller.gateway_name().to_string(),
        llm,
    }))
}
