//! Question corpus for the tutor.
//!
//! Loads `{question, answer}` records, embeds every question once and serves
//! exact nearest-neighbor lookups by Euclidean distance. The index is
//! immutable after [`CorpusIndex::build`] and safe to share behind an `Arc`.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use corpus_index::{CorpusIndex, embed::hashing::HashingEmbedder, load_corpus};
//!
//! # async fn run() -> Result<(), corpus_index::CorpusError> {
//! let entries = load_corpus("data/math_qa.json")?;
//! let index = CorpusIndex::build(entries, Arc::new(HashingEmbedder::new(384)?), 4).await?;
//! let hits = index.search("How do you add 7 and 5?", 1).await?;
//! println!("{:?}", hits.first().map(|h| &h.entry.question));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embed;
pub mod errors;
pub mod index;
pub mod loader;
pub mod record;

pub use config::{EmbeddingBackend, IndexConfig, build_embedder};
pub use embed::Embedder;
pub use errors::CorpusError;
pub use index::CorpusIndex;
pub use loader::{load_corpus, parse_corpus};
pub use record::{CorpusEntry, SearchHit};
