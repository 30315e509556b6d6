//! Unified error types for the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for corpus loading, embedding and indexing.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Corpus file could not be read.
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Corpus JSON could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Mismatch in vector dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Two corpus entries share the same id.
    #[error("duplicate corpus id: {0}")]
    DuplicateId(usize),

    /// LLM-backed embedding failed.
    #[error("embedding error: {0}")]
    Llm(#[from] ai_llm_service::AiLlmError),
}
