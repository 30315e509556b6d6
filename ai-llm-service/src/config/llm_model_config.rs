use crate::config::llm_provider::LlmProvider;

/// One model profile: which server, which model, and sampling knobs.
///
/// `endpoint` is the server root without `/api` or `/v1`. Unset knobs are
/// left out of the request so the server default applies.
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let chat = LlmModelConfig {
///     provider: LlmProvider::Ollama,
///     model: "deepseek-r1:1.5b".to_string(),
///     endpoint: "http://localhost:11434".to_string(),
///     api_key: None,
///     max_tokens: Some(512),
///     temperature: Some(0.7),
///     top_p: None,
///     timeout_secs: Some(60),
/// };
/// assert_eq!(chat.provider, LlmProvider::Ollama);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    /// Required by OpenAI-compatible servers, ignored by Ollama.
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    /// Whole-request timeout; 60 s when unset.
    pub timeout_secs: Option<u64>,
}
