//! Rewrites axum's plain-text JSON rejections (400/422) into the
//! [`ApiResponse`] error envelope.

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header::CONTENT_TYPE, response::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

const REQUEST_FIELDS: &[&str] = &[
    "user_input",
    "step_index",
    "current_steps",
    "current_question",
    "asked_ids",
    "recent_user_inputs",
    "recent_tutor_outputs",
];

async fn take_body(res: Response) -> (Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn guess_field(msg: &str) -> Option<String> {
    REQUEST_FIELDS
        .iter()
        .find(|f| msg.contains(*f))
        .map(|f| f.to_string())
}

fn hint_for(msg: &str) -> Option<String> {
    if msg.contains("missing field `user_input`") {
        Some("`user_input` is required (e.g. { \"user_input\": \"How do you add 7 and 5?\" }).".into())
    } else if msg.contains("expected a sequence") {
        Some("Expected an array for this field (e.g. [\"Step 1: ...\"]).".into())
    } else if msg.contains("expected i64") || msg.contains("invalid type: string") {
        Some("Expected an integer here.".into())
    } else if msg.contains("expected a map") || msg.contains("expected struct") {
        Some("Expected a JSON object here (e.g. { \"field\": \"value\" }).".into())
    } else {
        None
    }
}

/// Returns the request id header, setting one if absent.
fn ensure_request_id(parts: &mut Parts) -> String {
    if let Some(v) = parts
        .headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.trim().is_empty())
    {
        return v.to_string();
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    let id = format!("req-{nanos}");
    if let Ok(value) = HeaderValue::from_str(&id) {
        parts.headers.insert("X-Request-Id", value);
    }
    id
}

pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    if !(status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY) {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    let original = String::from_utf8_lossy(&bytes);
    let request_id = ensure_request_id(&mut parts);
    debug!(%request_id, status = status.as_u16(), body = %original.trim(), "mapping JSON rejection");

    let detail = ApiErrorDetail {
        path: guess_field(&original),
        hint: hint_for(&original),
    };

    let envelope = ApiResponse::<()>::error(
        if status == StatusCode::BAD_REQUEST {
            "BAD_REQUEST"
        } else {
            "UNPROCESSABLE_ENTITY"
        },
        original.trim(),
        vec![detail],
    );

    // keep the original body if the envelope cannot be encoded
    let body = serde_json::to_vec(&envelope).unwrap_or_else(|_| bytes.to_vec());

    parts
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Response::from_parts(parts, body.into())
}
