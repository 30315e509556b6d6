use std::{future::Future, pin::Pin};

use crate::errors::CorpusError;

pub mod hashing;
pub mod llm;

/// Boxed future returned by [`Embedder::embed`].
pub type EmbedFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<f32>, CorpusError>> + Send + 'a>>;

/// Asynchronous embedding provider.
///
/// Async is required because real providers (Ollama, OpenAI, ...) perform
/// HTTP requests. Implementations must be deterministic for a fixed model:
/// the same text yields the same vector.
pub trait Embedder: Send + Sync {
    /// Short name for logs and `/health`.
    fn name(&self) -> &str;

    /// Dimensionality of every vector this provider returns.
    fn dim(&self) -> usize;

    /// Async embedding function.
    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a>;
}
