/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// `OpenAI` covers every endpoint that speaks the OpenAI REST dialect
/// (`/v1/chat/completions`, `/v1/embeddings`), including OpenRouter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime.
    Ollama,
    /// OpenAI-compatible REST API.
    OpenAI,
}

impl LlmProvider {
    /// Parses `LLM_KIND` values (case-insensitive).
    ///
    /// Accepts `ollama`, `openai`, `chatgpt` and `openrouter`.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" | "chatgpt" | "openrouter" => Some(Self::OpenAI),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds() {
        assert_eq!(LlmProvider::parse("Ollama"), Some(LlmProvider::Ollama));
        assert_eq!(LlmProvider::parse(" openrouter "), Some(LlmProvider::OpenAI));
        assert_eq!(LlmProvider::parse("chatgpt"), Some(LlmProvider::OpenAI));
        assert_eq!(LlmProvider::parse("anthropic"), None);
    }
}
