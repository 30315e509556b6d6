//! Reachability checks behind `GET /health`.
//!
//! Ollama is asked for `/api/tags`, OpenAI-compatible servers for
//! `/v1/models`; in both cases the configured model must be listed.
//! A probe never fails: every problem becomes `ok = false` plus a message.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, HealthError, HttpError, make_snippet},
};

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: Option<String>,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

#[derive(Debug)]
pub struct HealthService {
    client: reqwest::Client,
    max_timeout: Duration,
}

/// Model listing of either provider, reduced to names. `OpenAi` comes first:
/// the Ollama shape has only optional fields and would match anything.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelListing {
    OpenAi { data: Vec<OpenAiModel> },
    Ollama { models: Option<Vec<OllamaTag>> },
}

#[derive(Debug, Deserialize)]
struct OllamaTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiModel {
    id: String,
}

impl ModelListing {
    /// `None` when the server did not enumerate its models.
    fn contains(&self, model: &str) -> Option<bool> {
        match self {
            Self::Ollama { models: None } => None,
            Self::Ollama { models: Some(tags) } => Some(tags.iter().any(|t| t.name == model)),
            Self::OpenAi { data } => Some(data.iter().any(|m| m.id == model)),
        }
    }
}

impl HealthService {
    /// `timeout_secs` caps every probe (default 10 s).
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let max_timeout = timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT);
        let client = reqwest::Client::builder().timeout(max_timeout).build()?;
        Ok(Self {
            client,
            max_timeout,
        })
    }

    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let started = Instant::now();
        let (ok, message) = match self.probe(cfg).await {
            Ok(Some(true)) => (true, "reachable; model is available".to_string()),
            Ok(Some(false)) => (false, format!("reachable, but `{}` is not listed", cfg.model)),
            Ok(None) => (true, "reachable".to_string()),
            Err(err) => {
                warn!(provider = ?cfg.provider, endpoint = %cfg.endpoint, error = %err, "health probe failed");
                (false, err.to_string())
            }
        };
        let latency_ms = started.elapsed().as_millis();
        debug!(provider = ?cfg.provider, model = %cfg.model, ok, latency_ms, "health probe finished");

        HealthStatus {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message,
        }
    }

    /// Probes sequentially, in input order.
    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    async fn probe(&self, cfg: &LlmModelConfig) -> Result<Option<bool>, AiLlmError> {
        let base = cfg.endpoint.trim_end_matches('/');
        let (url, what) = match cfg.provider {
            LlmProvider::Ollama => (format!("{base}/api/tags"), "/api/tags"),
            LlmProvider::OpenAI => (format!("{base}/v1/models"), "/v1/models"),
        };

        let mut req = self.client.get(&url).timeout(self.probe_timeout(cfg));
        if cfg.provider == LlmProvider::OpenAI {
            let key = cfg.api_key.as_deref().ok_or(HealthError::Unreadable {
                what: "OPENAI_API_KEY",
                reason: "missing API key".into(),
            })?;
            req = req.header(header::AUTHORIZATION, format!("Bearer {key}"));
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })
            .into());
        }

        let listing: ModelListing = resp.json().await.map_err(|e| HealthError::Unreadable {
            what,
            reason: e.to_string(),
        })?;
        Ok(listing.contains(&cfg.model))
    }

    fn probe_timeout(&self, cfg: &LlmModelConfig) -> Duration {
        cfg.timeout_secs
            .map(Duration::from_secs)
            .map_or(self.max_timeout, |t| t.min(self.max_timeout))
    }
}
