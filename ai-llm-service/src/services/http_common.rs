//! Pieces shared by the provider clients: endpoint checks, timeouts,
//! status mapping and response clean-up.

use std::time::{Duration, Instant};

use tracing::error;

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet},
};

/// Request timeout when the profile does not set one.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Validated endpoint without a trailing slash.
pub(crate) fn base_url(provider: Provider, cfg: &LlmModelConfig) -> Result<String, AiLlmError> {
    let endpoint = cfg.endpoint.trim();
    let has_scheme = endpoint.starts_with("http://") || endpoint.starts_with("https://");
    if !has_scheme {
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
        )
        .into());
    }
    Ok(endpoint.trim_end_matches('/').to_string())
}

pub(crate) fn timeout_of(cfg: &LlmModelConfig) -> Duration {
    cfg.timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT)
}

/// Passes 2xx responses through; anything else becomes `HttpStatus` with a
/// body snippet.
pub(crate) async fn ensure_success(
    provider: Provider,
    resp: reqwest::Response,
    url: &str,
    started: Instant,
) -> Result<reqwest::Response, AiLlmError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let snippet = make_snippet(&resp.text().await.unwrap_or_default());
    error!(
        ?provider,
        %status,
        %url,
        %snippet,
        latency_ms = started.elapsed().as_millis(),
        "LLM endpoint returned non-success status"
    );
    Err(ProviderError::new(
        provider,
        ProviderErrorKind::HttpStatus(HttpError {
            status,
            url: url.to_string(),
            snippet,
        }),
    )
    .into())
}

pub(crate) fn decode_error(provider: Provider, expected: &str, e: reqwest::Error) -> AiLlmError {
    ProviderError::new(
        provider,
        ProviderErrorKind::Decode(format!("serde error: {e}; expected {expected}")),
    )
    .into()
}

/// Drops `<think>…</think>` blocks emitted by reasoning models and trims.
///
/// An unclosed block swallows the rest of the text.
pub(crate) fn strip_reasoning(text: &str) -> String {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        match rest[start..].find(CLOSE) {
            Some(end) => rest = &rest[start + end + CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}
