//! Default LLM configs loaded strictly from environment variables.
//!
//! Two roles are resolved for the tutor:
//!
//! - **Chat**      → model used to rephrase a step or answer off-script input
//! - **Embedding** → optional model used to embed the question corpus
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND` = provider kind (`ollama`, `openai`, `openrouter`); unset = no LLM
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS` = optional HTTP timeout (u64, default 60)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = chat model (mandatory)
//! - `EMBEDDING_MODEL`             = embedding model (optional)
//!
//! OpenAI-compatible:
//! - `OPENAI_BASE_URL` = base URL (default `https://openrouter.ai/api`)
//! - `OPENAI_API_KEY`  = API key (mandatory)
//! - `OPENAI_MODEL`    = chat model (default `openai/gpt-3.5-turbo`)
//! - `EMBEDDING_MODEL` = embedding model (optional)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, env_opt_parse, http_endpoint, must_env, opt_env},
};

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_OPENAI_BASE: &str = "https://openrouter.ai/api";
const DEFAULT_OPENAI_MODEL: &str = "openai/gpt-3.5-turbo";

/// Reads `LLM_KIND`.
///
/// Returns `Ok(None)` when the variable is unset, so callers can run
/// without a language model.
///
/// # Errors
/// [`ConfigError::UnsupportedProvider`] for unknown values.
pub fn provider_from_env() -> Result<Option<LlmProvider>, AiLlmError> {
    match opt_env("LLM_KIND") {
        None => Ok(None),
        Some(kind) => LlmProvider::parse(&kind)
            .map(Some)
            .ok_or_else(|| ConfigError::UnsupportedProvider(kind).into()),
    }
}

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = opt_env("OLLAMA_URL") {
        return http_endpoint("OLLAMA_URL", &url);
    }
    if let Some(port) = env_opt_parse::<u16>("OLLAMA_PORT", "port (1..=65535)")? {
        return Ok(format!("http://localhost:{port}"));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

fn openai_endpoint() -> Result<String, AiLlmError> {
    let base = opt_env("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE.to_string());
    http_endpoint("OPENAI_BASE_URL", &base)
}

/// Constructs the **chat** profile for the given provider.
///
/// # Defaults
/// - `temperature = Some(0.7)`
/// - `top_p = Some(0.9)`
/// - `timeout_secs = LLM_TIMEOUT_SECS or 60`
pub fn config_chat(provider: LlmProvider) -> Result<LlmModelConfig, AiLlmError> {
    let max_tokens = env_opt_parse::<u32>("LLM_MAX_TOKENS", "u32")?;
    let timeout_secs =
        env_opt_parse::<u64>("LLM_TIMEOUT_SECS", "u64")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    let (endpoint, model, api_key) = match provider {
        LlmProvider::Ollama => (ollama_endpoint()?, must_env("OLLAMA_MODEL")?, None),
        LlmProvider::OpenAI => (
            openai_endpoint()?,
            opt_env("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            Some(must_env("OPENAI_API_KEY")?),
        ),
    };
    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens,
        temperature: Some(0.7),
        top_p: Some(0.9),
        timeout_secs: Some(timeout_secs),
    })
}

/// Constructs the **embedding** profile, or `None` if `EMBEDDING_MODEL` is unset.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(30)`
pub fn config_embedding(provider: LlmProvider) -> Result<Option<LlmModelConfig>, AiLlmError> {
    let Some(model) = opt_env("EMBEDDING_MODEL") else {
        return Ok(None);
    };

    let (endpoint, api_key) = match provider {
        LlmProvider::Ollama => (ollama_endpoint()?, None),
        LlmProvider::OpenAI => (openai_endpoint()?, Some(must_env("OPENAI_API_KEY")?)),
    };

    Ok(Some(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
    }))
}
