//! Flat exact nearest-neighbor index over question embeddings.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::{
    embed::Embedder,
    errors::CorpusError,
    record::{CorpusEntry, SearchHit},
};

/// Read-only index built once at startup and shared across requests.
///
/// Vectors are stored row-major in one buffer; row `i` belongs to
/// `entries[i]`. Entries are kept sorted by id, so ties in distance are
/// broken by ascending id.
pub struct CorpusIndex {
    entries: Vec<CorpusEntry>,
    vectors: Vec<f32>,
    dim: usize,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for CorpusIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusIndex")
            .field("entries", &self.entries.len())
            .field("dim", &self.dim)
            .field("embedder", &self.embedder.name())
            .finish()
    }
}

impl CorpusIndex {
    /// Embeds every question and builds the index.
    ///
    /// `concurrency` bounds the number of in-flight embedding calls.
    ///
    /// # Errors
    /// - [`CorpusError::DuplicateId`] if two entries share an id
    /// - [`CorpusError::VectorSizeMismatch`] if a vector has the wrong length
    /// - provider errors from the embedder
    #[instrument(skip_all, fields(entries = entries.len(), embedder = embedder.name()))]
    pub async fn build(
        mut entries: Vec<CorpusEntry>,
        embedder: Arc<dyn Embedder>,
        concurrency: usize,
    ) -> Result<Self, CorpusError> {
        let dim = embedder.dim();
        if dim == 0 {
            return Err(CorpusError::Config("embedding dim must be > 0".into()));
        }

        entries.sort_by_key(|e| e.id);
        if let Some(pair) = entries.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(CorpusError::DuplicateId(pair[0].id));
        }

        let provider = embedder.as_ref();
        let mut rows: Vec<(usize, Vec<f32>)> = stream::iter(entries.iter().enumerate())
            .map(|(row, entry)| async move {
                let v = provider.embed(&entry.question).await?;
                Ok::<(usize, Vec<f32>), CorpusError>((row, v))
            })
            .buffer_unordered(concurrency.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>, CorpusError>>()?;
        rows.sort_by_key(|(row, _)| *row);

        let mut vectors = Vec::with_capacity(entries.len() * dim);
        for (_, v) in rows {
            if v.len() != dim {
                return Err(CorpusError::VectorSizeMismatch {
                    got: v.len(),
                    want: dim,
                });
            }
            vectors.extend_from_slice(&v);
        }

        info!(entries = entries.len(), dim, "corpus index built");
        Ok(Self {
            entries,
            vectors,
            dim,
            embedder,
        })
    }

    /// Embeds `query` and returns the `k` nearest entries.
    ///
    /// An empty corpus yields an empty result without calling the embedder.
    ///
    /// # Errors
    /// Provider errors from embedding the query.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit<'_>>, CorpusError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let q = self.embedder.embed(query).await?;
        Ok(self.search_vector(&q, k))
    }

    /// Exact search by Euclidean distance.
    ///
    /// Results are sorted by non-decreasing distance (ties by ascending id)
    /// and contain `min(k, len)` hits. A query of the wrong dimension yields
    /// no hits.
    pub fn search_vector(&self, query: &[f32], k: usize) -> Vec<SearchHit<'_>> {
        if query.len() != self.dim {
            warn!(
                got = query.len(),
                want = self.dim,
                "query vector dimension mismatch; returning no hits"
            );
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(row, v)| (row, euclidean(query, v)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        debug!(hits = scored.len(), k, "search_vector");
        scored
            .into_iter()
            .map(|(row, distance)| SearchHit {
                entry: &self.entries[row],
                distance,
            })
            .collect()
    }

    /// All entries, sorted by id.
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Entry by corpus id.
    pub fn get(&self, id: usize) -> Option<&CorpusEntry> {
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Whether `id` names an entry of this corpus.
    pub fn contains(&self, id: usize) -> bool {
        self.get(id).is_some()
    }

    /// Corpus ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}
