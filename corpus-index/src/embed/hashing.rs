//! Deterministic offline embedder based on feature hashing.
//!
//! Each lowercase word token and each character trigram of a padded token is
//! hashed with blake3 into one of `dim` buckets with a signed weight; the
//! result is L2-normalized. Identical texts map to identical vectors and texts
//! sharing words land close to each other, which is enough for a small
//! question corpus when no embedding model is available.

use crate::{
    embed::{EmbedFuture, Embedder},
    errors::CorpusError,
};

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    /// # Errors
    /// [`CorpusError::Config`] if `dim == 0`.
    pub fn new(dim: usize) -> Result<Self, CorpusError> {
        if dim == 0 {
            return Err(CorpusError::Config("embedding dim must be > 0".into()));
        }
        Ok(Self { dim })
    }

    /// Synchronous embedding; the trait method wraps this.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        let lower = text.to_lowercase();

        for token in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            self.add_feature(&mut v, "w", token, WORD_WEIGHT);

            let padded: Vec<char> = std::iter::once('^')
                .chain(token.chars())
                .chain(std::iter::once('$'))
                .collect();
            for tri in padded.windows(3) {
                let gram: String = tri.iter().collect();
                self.add_feature(&mut v, "t", &gram, TRIGRAM_WEIGHT);
            }
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }

    fn add_feature(&self, v: &mut [f32], kind: &str, feature: &str, weight: f32) {
        let mut hasher = blake3::Hasher::new();
        hasher.update(kind.as_bytes());
        hasher.update(b":");
        hasher.update(feature.as_bytes());
        let hash = hasher.finalize();
        let bytes = hash.as_bytes();

        let mut head = [0u8; 8];
        head.copy_from_slice(&bytes[..8]);
        let bucket = (u64::from_le_bytes(head) % self.dim as u64) as usize;
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
        v[bucket] += sign * weight;
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a> {
        let v = self.embed_text(text);
        Box::pin(async move { Ok::<_, CorpusError>(v) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }

    #[test]
    fn zero_dim_is_rejected() {
        assert!(HashingEmbedder::new(0).is_err());
    }

    #[test]
    fn same_text_same_vector() {
        let e = HashingEmbedder::new(64).unwrap();
        assert_eq!(
            e.embed_text("How do you add 7 and 5?"),
            e.embed_text("How do you add 7 and 5?")
        );
    }

    #[test]
    fn case_and_punctuation_do_not_matter() {
        let e = HashingEmbedder::new(64).unwrap();
        assert_eq!(
            e.embed_text("How do you add 7 and 5?"),
            e.embed_text("how DO you add 7 and 5")
        );
    }

    #[test]
    fn vectors_are_unit_length() {
        let e = HashingEmbedder::new(128).unwrap();
        let v = e.embed_text("What is the area of a rectangle?");
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let e = HashingEmbedder::new(16).unwrap();
        assert!(e.embed_text("  ?! ").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn overlapping_questions_are_closer() {
        let e = HashingEmbedder::new(384).unwrap();
        let q = e.embed_text("add 7 and 5");
        let near = e.embed_text("How do you add 7 and 5?");
        let far = e.embed_text("What is the perimeter of a triangle?");
        assert!(dist(&q, &near) < dist(&q, &far));
    }

    #[tokio::test]
    async fn trait_embed_matches_sync() {
        let e = HashingEmbedder::new(32).unwrap();
        let via_trait = e.embed("fractions").await.unwrap();
        assert_eq!(via_trait, e.embed_text("fractions"));
        assert_eq!(e.dim(), 32);
    }
}
