//! Dialogue engine configuration from environment variables.

use std::{path::PathBuf, time::Duration};

use crate::error::FlowError;

/// Default upper bound for one rephrase call.
pub const DEFAULT_REPHRASE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    pub rephrase_timeout: Duration,
    /// Fixed seed for question draws; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    /// Optional JSON file with template overrides.
    pub templates_path: Option<PathBuf>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            rephrase_timeout: DEFAULT_REPHRASE_TIMEOUT,
            rng_seed: None,
            templates_path: None,
        }
    }
}

impl FlowConfig {
    /// Environment variables used:
    /// - `REPHRASE_TIMEOUT_SECS` (default: 60)
    /// - `TUTOR_RNG_SEED` (optional)
    /// - `TUTOR_TEMPLATES_PATH` (optional)
    pub fn from_env() -> Result<Self, FlowError> {
        let rephrase_timeout = match read_u64_env("REPHRASE_TIMEOUT_SECS")? {
            Some(0) => {
                return Err(FlowError::Config(
                    "REPHRASE_TIMEOUT_SECS must be > 0".into(),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_REPHRASE_TIMEOUT,
        };

        Ok(Self {
            rephrase_timeout,
            rng_seed: read_u64_env("TUTOR_RNG_SEED")?,
            templates_path: std::env::var("TUTOR_TEMPLATES_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn read_u64_env(key: &str) -> Result<Option<u64>, FlowError> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| FlowError::Config(format!("{key} is not a valid number: {v}"))),
        Err(_) => Ok(None),
    }
}
