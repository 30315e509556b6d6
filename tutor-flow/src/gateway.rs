//! Rephrasing through a generative model.
//!
//! The controller only sees [`RephraseGateway`]; failures come back as
//! [`GatewayError`] and are replaced by a fixed fallback text there.

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use ai_llm_service::{AiLlmError, LlmServiceProfiles};
use thiserror::Error;
use tracing::{Instrument, debug, info_span};

/// Why a rephrase attempt produced no text.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("rephrase timed out after {0:?}")]
    Timeout(Duration),

    #[error("no language model configured")]
    Unavailable,

    #[error("language model error: {0}")]
    Llm(#[from] AiLlmError),

    #[error("language model returned empty text")]
    Empty,
}

/// Context for one rephrase call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RephraseRequest<'a> {
    /// Step text the student is reacting to.
    pub previous_step: &'a str,
    pub question: Option<&'a str>,
    pub user_input: &'a str,
    /// Oldest first.
    pub recent_user_inputs: Vec<&'a str>,
    /// Oldest first.
    pub recent_tutor_outputs: Vec<&'a str>,
}

pub type RephraseFuture<'a> = Pin<Box<dyn Future<Output = Result<String, GatewayError>> + Send + 'a>>;

/// Generative-model collaborator. One attempt per call; no retries here.
pub trait RephraseGateway: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn rephrase<'a>(&'a self, request: RephraseRequest<'a>) -> RephraseFuture<'a>;
}

/// Persona for the chat profile.
pub const TUTOR_SYSTEM: &str = "You are a warm, patient math tutor talking with a student in real time. \
Speak naturally in one short paragraph with no bullet points or numbered lists. \
Put equations on their own line using symbols such as ×, ÷ and =.";

/// Builds the user prompt for a rephrase call.
///
/// # Example
/// ```
/// use tutor_flow::gateway::{RephraseRequest, build_rephrase_prompt};
/// let p = build_rephrase_prompt(&RephraseRequest {
///     previous_step: "Step 1: Start with 7.",
///     question: Some("How do you add 7 and 5?"),
///     user_input: "no",
///     recent_user_inputs: vec![],
///     recent_tutor_outputs: vec![],
/// });
/// assert!(p.contains("Step 1: Start with 7."));
/// ```
pub fn build_rephrase_prompt(req: &RephraseRequest<'_>) -> String {
    let mut out = String::new();
    out.push_str("Question: ");
    out.push_str(req.question.unwrap_or("(none yet)"));
    out.push_str("\nYour last explanation: ");
    out.push_str(req.previous_step);
    out.push_str("\nStudent just said: ");
    out.push_str(req.user_input.trim());
    out.push('\n');

    if !req.recent_user_inputs.is_empty() || !req.recent_tutor_outputs.is_empty() {
        out.push_str("\nRecent conversation (oldest first):\n");
        for (u, t) in req.recent_user_inputs.iter().zip(&req.recent_tutor_outputs) {
            out.push_str("Student: ");
            out.push_str(u);
            out.push_str("\nTutor: ");
            out.push_str(t);
            out.push('\n');
        }
    }

    out.push_str(
        "\nReply to the student.\n\
         - If they are confused, explain the same idea again in simpler words, \
         with a small example or everyday comparison. Do not repeat the last explanation verbatim.\n\
         - If they answered correctly, tell them so warmly.\n\
         - If they asked something else, answer briefly and lead back to the question.\n\
         - Do not reveal steps that come later in the solution.\n",
    );
    out
}

/// Gateway backed by the chat profile of [`LlmServiceProfiles`].
#[derive(Debug, Clone)]
pub struct LlmRephraseGateway {
    svc: Arc<LlmServiceProfiles>,
}

impl LlmRephraseGateway {
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Self {
        Self { svc }
    }
}

impl RephraseGateway for LlmRephraseGateway {
    fn name(&self) -> &str {
        "llm"
    }

    fn rephrase<'a>(&'a self, request: RephraseRequest<'a>) -> RephraseFuture<'a> {
        let span = info_span!("rephrase", model = %self.svc.profiles().0.model);
        Box::pin(
            async move {
                let prompt = build_rephrase_prompt(&request);
                let text = self
                    .svc
                    .generate_chat(&prompt, Some(TUTOR_SYSTEM))
                    .await
                    .map_err(GatewayError::from)?;
                let text = text.trim();
                if text.is_empty() {
                    return Err(GatewayError::Empty);
                }
                debug!(chars = text.len(), "rephrase generated");
                Ok(text.to_string())
            }
            .instrument(span),
        )
    }
}

/// Used when no language model is configured: every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGateway;

impl RephraseGateway for UnavailableGateway {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn rephrase<'a>(&'a self, _request: RephraseRequest<'a>) -> RephraseFuture<'a> {
        Box::pin(async { Err::<String, _>(GatewayError::Unavailable) })
    }
}
