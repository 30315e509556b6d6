//! Client for a local Ollama server.
//!
//! - `POST {endpoint}/api/generate` with `stream=false` for tutor replies;
//! - `POST {endpoint}/api/embeddings` for question vectors.
//!
//! Reasoning models served by Ollama (e.g. `deepseek-r1`) prefix their reply
//! with a `<think>` block; [`OllamaService::generate`] strips it so only the
//! spoken answer reaches the student.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind},
    services::http_common::{base_url, decode_error, ensure_success, strip_reasoning, timeout_of},
};

#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
    url_embeddings: String,
}

impl OllamaService {
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not Ollama
    /// - `InvalidEndpoint` if `cfg.endpoint` has no http(s) scheme
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(
                ProviderError::new(Provider::Ollama, ProviderErrorKind::InvalidProvider).into(),
            );
        }
        let base = base_url(Provider::Ollama, &cfg)?;

        let client = reqwest::Client::builder()
            .timeout(timeout_of(&cfg))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            url_generate: format!("{base}/api/generate"),
            url_embeddings: format!("{base}/api/embeddings"),
            cfg,
        })
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// One non-streaming completion. The returned text has reasoning blocks
    /// removed and may be empty.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = GenerateRequest {
            model: &self.cfg.model,
            prompt,
            system,
            stream: false,
            options: GenerateOptions {
                temperature: self.cfg.temperature,
                top_p: self.cfg.top_p,
                num_predict: self.cfg.max_tokens,
            },
        };

        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(Provider::Ollama, resp, &self.url_generate, started).await?;
        let out: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| decode_error(Provider::Ollama, "`{ response: string }`", e))?;

        let text = strip_reasoning(&out.response);
        debug!(
            latency_ms = started.elapsed().as_millis(),
            raw_len = out.response.len(),
            len = text.len(),
            "ollama generation completed"
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
                prompt: input,
            })
            .send()
            .await?;
        let resp = ensure_success(Provider::Ollama, resp, &self.url_embeddings, started).await?;
        let out: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| decode_error(Provider::Ollama, "`{ embedding: number[] }`", e))?;
        Ok(out.embedding)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions,
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(provider: LlmProvider, endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider,
            model: "deepseek-r1:1.5b".into(),
            endpoint: endpoint.into(),
            api_key: None,
            max_tokens: Some(128),
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn rejects_wrong_provider() {
        let err = OllamaService::new(cfg(LlmProvider::OpenAI, "http://localhost:11434"))
            .unwrap_err();
        assert!(err.to_string().contains("invalid provider"));
    }

    #[test]
    fn rejects_endpoint_without_scheme() {
        let err = OllamaService::new(cfg(LlmProvider::Ollama, "localhost:11434")).unwrap_err();
        assert!(err.to_string().contains("invalid endpoint"));
    }

    #[test]
    fn builds_api_urls() {
        let svc = OllamaService::new(cfg(LlmProvider::Ollama, "http://localhost:11434/")).unwrap();
        assert_eq!(svc.url_generate, "http://localhost:11434/api/generate");
        assert_eq!(svc.url_embeddings, "http://localhost:11434/api/embeddings");
    }

    #[test]
    fn generate_body_is_non_streaming_with_options() {
        let body = serde_json::to_value(GenerateRequest {
            model: "deepseek-r1:1.5b",
            prompt: "explain 7 + 5",
            system: None,
            stream: false,
            options: GenerateOptions {
                num_predict: Some(128),
                ..GenerateOptions::default()
            },
        })
        .unwrap();
        assert_eq!(body["stream"], serde_json::json!(false));
        assert_eq!(body["options"]["num_predict"], serde_json::json!(128));
        assert!(body["options"].get("temperature").is_none());
        assert!(body.get("system").is_none());
    }
}
