//! Corpus loading from a JSON array of `{question, answer}` objects.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::{errors::CorpusError, record::CorpusEntry};

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
}

/// Reads and parses the corpus file at `path`.
///
/// # Errors
/// [`CorpusError::Io`] if the file cannot be read, [`CorpusError::Parse`] if it
/// is not a JSON array of records.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<CorpusEntry>, CorpusError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_corpus(&raw)?;
    info!(path = %path.display(), entries = entries.len(), "corpus loaded");
    Ok(entries)
}

/// Parses corpus JSON from memory.
///
/// Ids are array positions. Records with a blank question or answer are
/// skipped; the remaining entries keep their original positions as ids.
pub fn parse_corpus(json: &str) -> Result<Vec<CorpusEntry>, CorpusError> {
    let records: Vec<RawRecord> = serde_json::from_str(json)?;
    let total = records.len();

    let entries: Vec<CorpusEntry> = records
        .into_iter()
        .enumerate()
        .filter_map(|(id, r)| {
            if r.question.trim().is_empty() || r.answer.trim().is_empty() {
                warn!(id, "skipping corpus record with blank question or answer");
                None
            } else {
                Some(CorpusEntry::new(id, r.question, r.answer))
            }
        })
        .collect();

    if entries.len() != total {
        warn!(
            kept = entries.len(),
            total, "some corpus records were skipped"
        );
    }
    Ok(entries)
}
