//! `POST /chat`: runs one tutoring turn.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::debug;
use tutor_flow::TurnOutcome;

use crate::{
    core::app_state::AppState,
    routes::chat::{chat_request::ChatRequest, chat_response::ChatResponse},
};

/// Handler: POST /chat
///
/// The turn itself cannot fail; malformed bodies are rejected by the JSON
/// extractor before this runs.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/chat \
///   -H 'content-type: application/json' \
///   -d '{"user_input":"How do you add 7 and 5?"}'
/// ```
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let (user_input, raw) = body.into_parts();
    let current = raw.into_state();

    let TurnOutcome {
        response,
        state: mut next,
        action,
    } = state.controller.turn(&user_input, &current).await;

    next.record_turn(user_input, response.clone());
    debug!(action = action.as_str(), recent = next.recent_turns.len(), "chat turn recorded");

    Json(ChatResponse::new(response, next, action))
}
