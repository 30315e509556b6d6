//! Shared LLM service with two profiles: `chat` and (optional) `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Provider clients are built eagerly, so a bad config fails at startup
//!   instead of on the first user turn.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{LlmModelConfig, LlmProvider, LlmServiceProfiles};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let chat = LlmModelConfig {
//!     provider: LlmProvider::Ollama,
//!     model: "deepseek-r1:1.5b".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     api_key: None,
//!     max_tokens: Some(512),
//!     temperature: Some(0.7),
//!     top_p: Some(0.9),
//!     timeout_secs: Some(60),
//! };
//!
//! let svc = Arc::new(LlmServiceProfiles::new(chat, None, Some(10))?);
//! let txt = svc.generate_chat("Explain 7 + 5", None).await?;
//! println!("{txt}");
//! # Ok(()) }
//! ```

use tracing::info;

use crate::{
    config::{
        default_config::{config_chat, config_embedding, provider_from_env},
        llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// A ready-to-use client for one profile.
#[derive(Debug)]
enum ProviderClient {
    Ollama(OllamaService),
    OpenAi(OpenAiService),
}

impl ProviderClient {
    fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        Ok(match cfg.provider {
            LlmProvider::Ollama => Self::Ollama(OllamaService::new(cfg)?),
            LlmProvider::OpenAI => Self::OpenAi(OpenAiService::new(cfg)?),
        })
    }

    fn config(&self) -> &LlmModelConfig {
        match self {
            Self::Ollama(c) => c.config(),
            Self::OpenAi(c) => c.config(),
        }
    }

    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        match self {
            Self::Ollama(c) => c.generate(prompt, system).await,
            Self::OpenAi(c) => c.generate(prompt, system).await,
        }
    }

    async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match self {
            Self::Ollama(c) => c.embeddings(input).await,
            Self::OpenAi(c) => c.embeddings(input).await,
        }
    }
}

/// Shared service that manages the **chat** and **embedding** profiles.
#[derive(Debug)]
pub struct LlmServiceProfiles {
    chat: ProviderClient,
    embedding: Option<ProviderClient>,
    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service.
    ///
    /// - `chat`: required generation profile.
    /// - `embedding`: optional embedding profile.
    /// - `health_timeout_secs`: optional timeout for the health checker.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if any provider client cannot be built.
    pub fn new(
        chat: LlmModelConfig,
        embedding: Option<LlmModelConfig>,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        Ok(Self {
            chat: ProviderClient::new(chat)?,
            embedding: embedding.map(ProviderClient::new).transpose()?,
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Builds profiles from environment variables.
    ///
    /// Returns `Ok(None)` when `LLM_KIND` is unset: the tutor then runs
    /// without a language model and every rephrase falls back to a fixed text.
    ///
    /// # Errors
    /// Config errors for a set-but-invalid environment.
    pub fn from_env() -> Result<Option<Self>, AiLlmError> {
        let Some(provider) = provider_from_env()? else {
            info!("LLM_KIND is not set; LLM profiles disabled");
            return Ok(None);
        };
        let chat = config_chat(provider)?;
        let embedding = config_embedding(provider)?;
        info!(
            provider = ?provider,
            chat_model = %chat.model,
            embedding_model = %embedding.as_ref().map(|e| e.model.as_str()).unwrap_or("n/a"),
            "LLM profiles loaded from env"
        );
        Self::new(chat, embedding, Some(10)).map(Some)
    }

    /// Generates text using the **chat** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if generation fails.
    pub async fn generate_chat(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, AiLlmError> {
        self.chat.generate(prompt, system).await
    }

    /// Computes embeddings using the **embedding** profile.
    ///
    /// # Errors
    /// [`AiLlmError::MissingProfile`] if no embedding model is configured,
    /// otherwise provider errors.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match &self.embedding {
            Some(cli) => cli.embeddings(input).await,
            None => Err(AiLlmError::MissingProfile("embedding")),
        }
    }

    /// Whether an embedding profile is configured.
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }

    /// Returns a health snapshot for all distinct profiles.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = vec![self.chat.config().clone()];
        if let Some(e) = &self.embedding {
            if e.config() != self.chat.config() {
                list.push(e.config().clone());
            }
        }
        self.health.check_many(&list).await
    }

    /// Returns references to the current profiles `(chat, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, Option<&LlmModelConfig>) {
        (
            self.chat.config(),
            self.embedding.as_ref().map(ProviderClient::config),
        )
    }
}
