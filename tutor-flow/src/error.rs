use std::path::PathBuf;

use thiserror::Error;

/// Setup errors for the dialogue engine.
///
/// Turns themselves never fail; these only occur while building a
/// [`crate::TurnController`] from configuration.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid templates file: {0}")]
    Templates(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}
