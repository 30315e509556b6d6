//! Runtime configuration: corpus location and embedding backend.

use std::{path::PathBuf, sync::Arc};

use ai_llm_service::LlmServiceProfiles;

use crate::{
    embed::{Embedder, hashing::HashingEmbedder, llm::LlmEmbedder},
    errors::CorpusError,
};

/// Which embedder backs the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Offline feature hashing.
    Hashing,
    /// The `embedding` profile of the LLM service.
    Llm,
}

impl EmbeddingBackend {
    /// Parse from env string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hashing" | "hash" => Some(Self::Hashing),
            "llm" | "ollama" | "openai" => Some(Self::Llm),
            _ => None,
        }
    }
}

/// Index configuration.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// JSON array of `{question, answer}` records.
    pub corpus_path: PathBuf,
    pub backend: EmbeddingBackend,
    /// Embedding dimensionality.
    pub dim: usize,
    /// Max in-flight embedding calls during build.
    pub concurrency: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/math_qa.json"),
            backend: EmbeddingBackend::Hashing,
            dim: 384,
            concurrency: 4,
        }
    }
}

impl IndexConfig {
    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `CORPUS_PATH` (default: "data/math_qa.json")
    /// - `EMBEDDING_PROVIDER` ("hashing" | "llm"; default: "hashing")
    /// - `EMBEDDING_DIM` (default: 384)
    /// - `EMBEDDING_CONCURRENCY` (default: 4)
    pub fn from_env() -> Result<Self, CorpusError> {
        let defaults = Self::default();

        let corpus_path = std::env::var("CORPUS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.corpus_path);

        let backend = match std::env::var("EMBEDDING_PROVIDER") {
            Ok(v) => EmbeddingBackend::parse(&v).ok_or_else(|| {
                CorpusError::Config(format!("unsupported EMBEDDING_PROVIDER: {v}"))
            })?,
            Err(_) => defaults.backend,
        };

        let cfg = Self {
            corpus_path,
            backend,
            dim: read_usize_env("EMBEDDING_DIM")?.unwrap_or(defaults.dim),
            concurrency: read_usize_env("EMBEDDING_CONCURRENCY")?.unwrap_or(defaults.concurrency),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), CorpusError> {
        if self.dim == 0 {
            return Err(CorpusError::Config("EMBEDDING_DIM must be > 0".into()));
        }
        if self.concurrency == 0 {
            return Err(CorpusError::Config(
                "EMBEDDING_CONCURRENCY must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Constructs the embedder selected by `cfg`.
///
/// # Errors
/// [`CorpusError::Config`] if the LLM backend is selected but no LLM service
/// (or no embedding profile) is configured.
pub fn build_embedder(
    cfg: &IndexConfig,
    llm: Option<Arc<LlmServiceProfiles>>,
) -> Result<Arc<dyn Embedder>, CorpusError> {
    match cfg.backend {
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbedder::new(cfg.dim)?)),
        EmbeddingBackend::Llm => {
            let svc = llm.ok_or_else(|| {
                CorpusError::Config("EMBEDDING_PROVIDER=llm requires LLM_KIND".into())
            })?;
            Ok(Arc::new(LlmEmbedder::new(svc, cfg.dim)?))
        }
    }
}

/// Read an optional `usize` from env; present but unparsable is an error.
fn read_usize_env(key: &str) -> Result<Option<usize>, CorpusError> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| CorpusError::Config(format!("{key} is not a valid number: {v}"))),
        Err(_) => Ok(None),
    }
}
