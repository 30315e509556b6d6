//! Client-owned dialogue state.
//!
//! The server keeps nothing between turns: the state arrives with each
//! request, is sanitized, and a new state goes back with the response.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of recent `(user_input, tutor_response)` pairs kept.
pub const RECENT_TURNS_CAPACITY: usize = 3;

/// One exchange of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user_input: String,
    pub tutor_response: String,
}

/// FIFO window of the most recent turns; the oldest is evicted first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Turn>", into = "Vec<Turn>")]
pub struct RecentTurns {
    turns: VecDeque<Turn>,
}

impl RecentTurns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn, dropping the oldest beyond capacity.
    pub fn push(&mut self, user_input: impl Into<String>, tutor_response: impl Into<String>) {
        self.turns.push_back(Turn {
            user_input: user_input.into(),
            tutor_response: tutor_response.into(),
        });
        while self.turns.len() > RECENT_TURNS_CAPACITY {
            self.turns.pop_front();
        }
    }

    /// Pairs two parallel lists, aligned at their most recent end.
    ///
    /// Extra items on the longer list have no partner and are ignored.
    pub fn from_parallel(user_inputs: &[String], tutor_outputs: &[String]) -> Self {
        let n = user_inputs.len().min(tutor_outputs.len());
        let users = &user_inputs[user_inputs.len() - n..];
        let tutors = &tutor_outputs[tutor_outputs.len() - n..];

        let mut out = Self::new();
        for (u, t) in users.iter().zip(tutors) {
            out.push(u.as_str(), t.as_str());
        }
        out
    }

    /// User inputs, oldest first.
    pub fn user_inputs(&self) -> Vec<&str> {
        self.turns.iter().map(|t| t.user_input.as_str()).collect()
    }

    /// Tutor responses, oldest first.
    pub fn tutor_outputs(&self) -> Vec<&str> {
        self.turns.iter().map(|t| t.tutor_response.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<Turn>> for RecentTurns {
    fn from(turns: Vec<Turn>) -> Self {
        let mut out = Self::new();
        for t in turns {
            out.push(t.user_input, t.tutor_response);
        }
        out
    }
}

impl From<RecentTurns> for Vec<Turn> {
    fn from(r: RecentTurns) -> Self {
        r.turns.into()
    }
}

/// Session state round-tripped through the client.
///
/// Guaranteed after [`DialogueState::sanitized`]:
/// `step_index < max(1, current_steps.len())`, and `current_question` is
/// `None` whenever `current_steps` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueState {
    pub step_index: usize,
    pub current_steps: Vec<String>,
    pub current_question: Option<String>,
    pub asked_ids: BTreeSet<usize>,
    pub recent_turns: RecentTurns,
}

impl DialogueState {
    /// Empty state: no active question, nothing asked yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a question is in progress.
    pub fn has_active_question(&self) -> bool {
        !self.current_steps.is_empty()
    }

    /// Records a finished turn in the recent-turns window.
    pub fn record_turn(&mut self, user_input: impl Into<String>, tutor_response: impl Into<String>) {
        self.recent_turns.push(user_input, tutor_response);
    }

    /// Returns a copy with the cursor clamped and unknown ids dropped.
    ///
    /// `is_known` tells whether an id belongs to the current corpus.
    pub fn sanitized(&self, is_known: impl Fn(usize) -> bool) -> Self {
        let mut out = self.clone();

        let upper = out.current_steps.len().max(1);
        if out.step_index >= upper {
            debug!(
                step_index = out.step_index,
                steps = out.current_steps.len(),
                "clamping step_index"
            );
            out.step_index = upper - 1;
        }
        if out.current_steps.is_empty() {
            out.current_question = None;
        }
        out.asked_ids.retain(|id| is_known(*id));
        out
    }
}

/// State exactly as a client sent it, before any validation.
///
/// Integers are signed so that a negative cursor or id can be clamped or
/// dropped instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDialogueState {
    pub step_index: i64,
    pub current_steps: Vec<String>,
    pub current_question: Option<String>,
    pub asked_ids: Vec<i64>,
    pub recent_user_inputs: Vec<String>,
    pub recent_tutor_outputs: Vec<String>,
}

impl RawDialogueState {
    /// Converts into a typed state.
    ///
    /// Negative cursor becomes 0; negative ids are dropped and duplicates
    /// collapse. Corpus membership and cursor bounds are checked later by
    /// [`DialogueState::sanitized`].
    pub fn into_state(self) -> DialogueState {
        let step_index = usize::try_from(self.step_index).unwrap_or(0);
        let asked_ids = self
            .asked_ids
            .into_iter()
            .filter_map(|id| usize::try_from(id).ok())
            .collect();

        DialogueState {
            step_index,
            current_steps: self.current_steps,
            current_question: self.current_question,
            asked_ids,
            recent_turns: RecentTurns::from_parallel(
                &self.recent_user_inputs,
                &self.recent_tutor_outputs,
            ),
        }
    }
}
