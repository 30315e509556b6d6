//! HTTP surface of the math tutor.
//!
//! - `POST /chat`: one tutoring turn; the client sends back the returned state
//!   with its next input.
//! - `GET /health`: corpus summary and LLM reachability.

use std::{env, sync::Arc};

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

pub use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};
use crate::{
    error_handler::not_found,
    middleware_layer::json_extractor::json_error_mapper,
    routes::{chat::chat_route::chat, health::health_route::health},
};

/// Bind address used when `API_ADDRESS` is unset.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";

/// Builds state from the environment and serves until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let address = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_ADDRESS.into());
    let state = Arc::new(AppState::from_env().await?);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(AppError::Bind)?;
    info!(%address, "math tutor API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Routes with the JSON error mapper applied.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Resolves on Ctrl+C. If the signal cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use corpus_index::{CorpusEntry, CorpusIndex, embed::hashing::HashingEmbedder};
    use serde_json::{Value, json};
    use tower::util::ServiceExt;
    use tutor_flow::{TurnAction, TurnController, UnavailableGateway};

    use super::*;
    use crate::routes::chat::chat_response::ChatResponse;

    async fn test_router() -> Router {
        let entries = vec![
            CorpusEntry::new(
                0,
                "How do you add 7 and 5?",
                "Step 1: Start with 7. Step 2: Count up 5 more to reach 12.",
            ),
            CorpusEntry::new(
                1,
                "What is 12 divided by 3?",
                "Step 1: Split 12 into 3 equal groups. Step 2: Each group has 4.",
            ),
        ];
        let index = CorpusIndex::build(entries, Arc::new(HashingEmbedder::new(64).unwrap()), 2)
            .await
            .unwrap();
        let controller =
            TurnController::new(Arc::new(index), Arc::new(UnavailableGateway)).with_rng_seed(9);
        router(Arc::new(AppState::new(controller, None)))
    }

    async fn post_chat(app: &Router, body: String) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn first_turn_starts_a_question() {
        let app = test_router().await;
        let (status, v) = post_chat(&app, json!({"user_input": "How do you add 7 and 5?"}).to_string()).await;

        assert_eq!(status, StatusCode::OK);
        let res: ChatResponse = serde_json::from_value(v).unwrap();
        assert_eq!(res.action, TurnAction::Started);
        assert!(res.response.contains("Step 1: Start with 7."));
        assert_eq!(res.step_index, 0);
        assert_eq!(res.current_steps.len(), 2);
        assert_eq!(res.asked_ids, vec![0]);
        assert_eq!(res.recent_user_inputs, vec!["How do you add 7 and 5?"]);
        assert_eq!(res.recent_tutor_outputs, vec![res.response.clone()]);
    }

    #[tokio::test]
    async fn state_round_trips_through_the_client() {
        let app = test_router().await;
        let (_, mut v) = post_chat(&app, json!({"user_input": "How do you add 7 and 5?"}).to_string()).await;

        let inputs = ["no", "yes", "what is counting up?", "yes"];
        for input in inputs {
            v["user_input"] = json!(input);
            let (status, next) = post_chat(&app, v.to_string()).await;
            assert_eq!(status, StatusCode::OK);
            v = next;
        }

        let res: ChatResponse = serde_json::from_value(v).unwrap();
        // second "yes" finished question 0 and drew the only other one
        assert_eq!(res.action, TurnAction::NewQuestion);
        assert_eq!(res.current_question.as_deref(), Some("What is 12 divided by 3?"));
        assert_eq!(res.asked_ids, vec![0, 1]);
        assert_eq!(
            res.recent_user_inputs,
            vec!["yes", "what is counting up?", "yes"]
        );
    }

    #[tokio::test]
    async fn legacy_fields_and_malformed_state_are_accepted() {
        let app = test_router().await;
        let body = json!({
            "user_input": "yes",
            "step_idx": -3,
            "last_steps": ["Step 1: Start with 7.", "Step 2: Count up 5 more to reach 12."],
            "last_question": "How do you add 7 and 5?",
            "asked_indices": [-1, 0, 0, 42]
        });
        let (status, v) = post_chat(&app, body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        let res: ChatResponse = serde_json::from_value(v).unwrap();
        assert_eq!(res.action, TurnAction::Advanced);
        assert_eq!(res.step_index, 1);
        assert_eq!(res.asked_ids, vec![0]);
    }

    #[tokio::test]
    async fn gateway_failure_still_answers() {
        let app = test_router().await;
        let body = json!({
            "user_input": "no",
            "current_steps": ["Step 1: Start with 7.", "Step 2: Count up 5 more to reach 12."],
            "current_question": "How do you add 7 and 5?",
            "asked_ids": [0]
        });
        let (status, v) = post_chat(&app, body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["action"], "rephrase_fallback");
        assert!(
            v["response"]
                .as_str()
                .unwrap()
                .starts_with("Sorry, I couldn't rephrase that right now.")
        );
    }

    #[tokio::test]
    async fn exit_resets_state() {
        let app = test_router().await;
        let body = json!({
            "user_input": "EXIT",
            "step_index": 1,
            "current_steps": ["Step 1: a", "Step 2: b"],
            "asked_ids": [0, 1]
        });
        let (_, v) = post_chat(&app, body.to_string()).await;
        let res: ChatResponse = serde_json::from_value(v).unwrap();

        assert_eq!(res.response, "Great job today! See you next time.");
        assert_eq!(res.step_index, 0);
        assert!(res.current_steps.is_empty());
        assert!(res.asked_ids.is_empty());
        assert_eq!(res.recent_user_inputs, vec!["EXIT"]);
    }

    #[tokio::test]
    async fn syntax_error_is_wrapped_in_envelope() {
        let app = test_router().await;
        let (status, v) = post_chat(&app, "{not json".into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn missing_user_input_is_unprocessable() {
        let app = test_router().await;
        let (status, v) = post_chat(&app, json!({"step_index": 0}).to_string()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(v["error"]["code"], "UNPROCESSABLE_ENTITY");
        assert_eq!(v["error"]["details"][0]["path"], "user_input");
    }

    #[tokio::test]
    async fn health_reports_corpus() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["data"]["corpus_size"], 2);
        assert_eq!(v["data"]["index_dim"], 64);
        assert_eq!(v["data"]["embedder"], "hashing");
        assert_eq!(v["data"]["gateway"], "unavailable");
        assert_eq!(v["data"]["llm"], json!([]));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = test_router().await;
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
