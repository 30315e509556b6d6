//! Embedding provider backed by the shared LLM service.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use tracing::warn;

use crate::{
    embed::{EmbedFuture, Embedder},
    errors::CorpusError,
};

/// Calls the `embedding` profile of [`LlmServiceProfiles`] and enforces the
/// configured dimension.
#[derive(Debug, Clone)]
pub struct LlmEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: usize,
}

impl LlmEmbedder {
    /// # Errors
    /// [`CorpusError::Config`] if the service has no embedding profile or `dim == 0`.
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: usize) -> Result<Self, CorpusError> {
        if !svc.has_embedding() {
            return Err(CorpusError::Config(
                "EMBEDDING_PROVIDER=llm requires EMBEDDING_MODEL".into(),
            ));
        }
        if dim == 0 {
            return Err(CorpusError::Config("embedding dim must be > 0".into()));
        }
        Ok(Self { svc, dim })
    }
}

impl Embedder for LlmEmbedder {
    fn name(&self) -> &str {
        "llm"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a> {
        Box::pin(async move {
            let v = self.svc.embed(text).await.map_err(CorpusError::from)?;
            if v.len() != self.dim {
                warn!(got = v.len(), want = self.dim, "embedding dimension mismatch");
                return Err(CorpusError::VectorSizeMismatch {
                    got: v.len(),
                    want: self.dim,
                });
            }
            Ok(v)
        })
    }
}
