//! Corpus records and search hits.

use serde::{Deserialize, Serialize};

/// One question/answer pair. Immutable once loaded.
///
/// `id` is the record's position in the source collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub id: usize,
    pub question: String,
    pub answer: String,
}

impl CorpusEntry {
    pub fn new(id: usize, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id,
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A single nearest-neighbor hit, borrowed from the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit<'a> {
    pub entry: &'a CorpusEntry,
    /// Euclidean distance between the query and the entry's question embedding.
    pub distance: f32,
}
