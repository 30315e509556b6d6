//! Client for OpenAI-compatible APIs (OpenAI, OpenRouter, vLLM, ...).
//!
//! `endpoint` is the API root without `/v1`, e.g. `https://openrouter.ai/api`:
//! - `POST {endpoint}/v1/chat/completions` (non-streaming)
//! - `POST {endpoint}/v1/embeddings`

use std::time::Instant;

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind},
    services::http_common::{base_url, decode_error, ensure_success, strip_reasoning, timeout_of},
};

#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embeddings: String,
}

impl OpenAiService {
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not OpenAI
    /// - `MissingApiKey` if `cfg.api_key` is absent
    /// - `InvalidEndpoint` if `cfg.endpoint` has no http(s) scheme
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let fail = |kind| -> AiLlmError { ProviderError::new(Provider::OpenAI, kind).into() };

        if cfg.provider != LlmProvider::OpenAI {
            return Err(fail(ProviderErrorKind::InvalidProvider));
        }
        let Some(api_key) = cfg.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            return Err(fail(ProviderErrorKind::MissingApiKey));
        };
        let base = base_url(Provider::OpenAI, &cfg)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim())).map_err(|e| {
            fail(ProviderErrorKind::Decode(format!(
                "API key is not a valid header value: {e}"
            )))
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let timeout = timeout_of(&cfg);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        info!(
            model = %cfg.model,
            endpoint = %base,
            timeout_secs = timeout.as_secs(),
            "OpenAI-compatible client ready"
        );

        Ok(Self {
            client,
            url_chat: format!("{base}/v1/chat/completions"),
            url_embeddings: format!("{base}/v1/embeddings"),
            cfg,
        })
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// One chat completion: optional system message, then `prompt` as user.
    ///
    /// # Errors
    /// `EmptyChoices` if no choice carries non-blank content, otherwise
    /// transport, status or decode errors.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let mut messages = Vec::with_capacity(2);
        if let Some(content) = system {
            messages.push(ChatMessage {
                role: "system",
                content,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });
        let body = ChatRequest {
            model: &self.cfg.model,
            messages,
            temperature: self.cfg.temperature,
            top_p: self.cfg.top_p,
            max_tokens: self.cfg.max_tokens,
        };

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;
        let resp = ensure_success(Provider::OpenAI, resp, &self.url_chat, started).await?;
        let out: ChatResponse = resp
            .json()
            .await
            .map_err(|e| decode_error(Provider::OpenAI, "`choices[0].message.content`", e))?;

        let text = out
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .map(|c| strip_reasoning(&c))
            .find(|c| !c.is_empty())
            .ok_or_else(|| ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices))?;

        debug!(
            latency_ms = started.elapsed().as_millis(),
            len = text.len(),
            "chat completion completed"
        );
        Ok(text)
    }

    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let started = Instant::now();
        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&EmbeddingsRequest {
                model: &self.cfg.model,
                input,
            })
            .send()
            .await?;
        let resp = ensure_success(Provider::OpenAI, resp, &self.url_embeddings, started).await?;
        let out: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| decode_error(Provider::OpenAI, "`data[0].embedding`", e))?;

        out.data.into_iter().next().map(|d| d.embedding).ok_or_else(|| {
            ProviderError::new(
                Provider::OpenAI,
                ProviderErrorKind::Decode("embeddings response has empty `data`".into()),
            )
            .into()
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(api_key: Option<&str>) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "openai/gpt-3.5-turbo".into(),
            endpoint: "https://openrouter.ai/api/".into(),
            api_key: api_key.map(str::to_string),
            max_tokens: None,
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(10),
        }
    }

    #[test]
    fn requires_api_key() {
        let err = OpenAiService::new(cfg(None)).unwrap_err();
        assert!(err.to_string().contains("missing API key"));
        let err = OpenAiService::new(cfg(Some("  "))).unwrap_err();
        assert!(err.to_string().contains("missing API key"));
    }

    #[test]
    fn derives_v1_urls() {
        let svc = OpenAiService::new(cfg(Some("sk-test"))).unwrap();
        assert_eq!(svc.url_chat, "https://openrouter.ai/api/v1/chat/completions");
        assert_eq!(svc.url_embeddings, "https://openrouter.ai/api/v1/embeddings");
    }

    #[test]
    fn chat_body_skips_unset_knobs() {
        let body = serde_json::to_value(ChatRequest {
            model: "openai/gpt-3.5-turbo",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "be kind",
                },
                ChatMessage {
                    role: "user",
                    content: "explain 7 + 5",
                },
            ],
            temperature: Some(0.7),
            top_p: None,
            max_tokens: None,
        })
        .unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "explain 7 + 5");
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn decodes_first_non_empty_choice() {
        let raw = r#"{"choices":[{"message":{"content":null}},{"message":{"content":"Twelve!"}}]}"#;
        let out: ChatResponse = serde_json::from_str(raw).unwrap();
        let first = out.choices.into_iter().find_map(|c| c.message.content);
        assert_eq!(first.as_deref(), Some("Twelve!"));
    }
}
