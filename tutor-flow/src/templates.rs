//! Fixed response building blocks.
//!
//! Every field has a default; a JSON object with any subset of the keys
//! replaces the matching defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::FlowError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorTemplates {
    pub greeting: String,
    /// Comprehension check appended after every step and rephrase.
    pub step_prompt: String,
    pub farewell: String,
    pub no_match: String,
    pub completed: String,
    /// Introduces a question drawn after finishing the previous one.
    pub new_question: String,
    pub rephrase_fallback: String,
    pub open_ended_fallback: String,
}

impl Default for TutorTemplates {
    fn default() -> Self {
        Self {
            greeting: "Hi! I'm your math tutor. Let's work through this together.".into(),
            step_prompt: "Does this make sense so far? (Yes/No)".into(),
            farewell: "Great job today! See you next time.".into(),
            no_match: "Sorry, I couldn't find a relevant math problem.".into(),
            completed: "You've completed all available questions! Great job!".into(),
            new_question: "Here's a new question!".into(),
            rephrase_fallback: "Sorry, I couldn't rephrase that right now.".into(),
            open_ended_fallback: "Sorry, I couldn't process your input right now.".into(),
        }
    }
}

impl TutorTemplates {
    /// Parses overrides from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads overrides from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| FlowError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let t = Self::from_json(&raw)?;
        info!(path = %path.display(), "tutor templates loaded");
        Ok(t)
    }

    /// `text` followed by the comprehension check.
    pub fn with_prompt(&self, text: &str) -> String {
        lines(&[text, &self.step_prompt])
    }

    /// Greeting, first step, prompt.
    pub fn first_step(&self, step: &str) -> String {
        lines(&[&self.greeting, step, &self.step_prompt])
    }

    /// Introduction, question, first step, prompt.
    pub fn next_question(&self, question: &str, step: &str) -> String {
        lines(&[&self.new_question, question, step, &self.step_prompt])
    }
}

fn lines(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
