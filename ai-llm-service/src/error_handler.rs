//! Errors of the LLM layer.
//!
//! [`AiLlmError`] is what every public function returns. Startup problems
//! land in [`ConfigError`], `/health` probe problems in [`HealthError`] and
//! request-time failures in [`ProviderError`]. Messages carry an
//! `[LLM]` prefix so they stand out in mixed logs.

use std::{fmt, str::FromStr};

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AiLlmError>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Health(#[from] HealthError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("[LLM] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// The caller asked for a profile that the environment did not configure.
    #[error("[LLM] profile `{0}` is not configured")]
    MissingProfile(&'static str),
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("[LLM] missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("[LLM] {var} is not a valid {expected}")]
    InvalidNumber {
        var: &'static str,
        expected: &'static str,
    },

    #[error("[LLM] unsupported provider in LLM_KIND: {0}")]
    UnsupportedProvider(String),

    #[error("[LLM] {var} must start with http:// or https:// (got `{value}`)")]
    InvalidEndpoint { var: &'static str, value: String },

    #[error("[LLM] model name must not be empty")]
    EmptyModel,
}

/// A non-2xx answer from an LLM server.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    /// Trimmed head of the body, see [`make_snippet`].
    pub snippet: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.status, self.url, self.snippet)
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("[LLM] health probe failed: {0}")]
    HttpStatus(HttpError),

    #[error("[LLM] health probe could not read {what}: {reason}")]
    Unreadable { what: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    OpenAI,
}

#[derive(Debug)]
pub enum ProviderErrorKind {
    /// Config was built for the other client.
    InvalidProvider,
    MissingApiKey,
    InvalidEndpoint(String),
    HttpStatus(HttpError),
    Decode(String),
    /// Every choice was missing or blank after clean-up.
    EmptyChoices,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProvider => f.write_str("invalid provider for this client"),
            Self::MissingApiKey => f.write_str("missing API key"),
            Self::InvalidEndpoint(e) => write!(f, "invalid endpoint: {e}"),
            Self::HttpStatus(h) => h.fmt(f),
            Self::Decode(msg) => write!(f, "unexpected response: {msg}"),
            Self::EmptyChoices => f.write_str("model returned no usable text"),
        }
    }
}

#[derive(Debug, Error)]
#[error("[LLM] {provider:?}: {kind}")]
pub struct ProviderError {
    pub provider: Provider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: Provider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

const SNIPPET_CHARS: usize = 240;

pub fn make_snippet(body: &str) -> String {
    body.trim().chars().take(SNIPPET_CHARS).collect()
}

/// Required, non-blank variable.
pub fn must_env(name: &'static str) -> Result<String> {
    opt_env(name).ok_or_else(|| ConfigError::MissingVar(name).into())
}

/// `None` for unset and blank alike.
pub fn opt_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses an optional numeric variable; `expected` names the type in the
/// error message.
pub fn env_opt_parse<T: FromStr>(name: &'static str, expected: &'static str) -> Result<Option<T>> {
    opt_env(name)
        .map(|v| {
            v.trim().parse::<T>().map_err(|_| {
                AiLlmError::from(ConfigError::InvalidNumber {
                    var: name,
                    expected,
                })
            })
        })
        .transpose()
}

/// Trimmed `value` if it carries an http(s) scheme.
pub fn http_endpoint(var: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.to_string())
    } else {
        Err(ConfigError::InvalidEndpoint {
            var,
            value: value.to_string(),
        }
        .into())
    }
}
