//! Per-turn state machine.
//!
//! Given the user's input and the client's state, [`TurnController::turn`]
//! picks exactly one transition, in this priority order:
//!
//! 1. exit token: farewell and full reset;
//! 2. no active question: search the corpus with the input;
//! 3. negative token: rephrase the current step;
//! 4. affirmative token: next step, or a new unasked question, or completion;
//! 5. anything else: open-ended reply through the gateway.
//!
//! The caller's state is never mutated. Recording the finished turn in
//! `recent_turns` is left to the caller.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use corpus_index::{CorpusEntry, CorpusIndex};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::{DEFAULT_REPHRASE_TIMEOUT, FlowConfig},
    error::FlowError,
    gateway::{GatewayError, RephraseGateway, RephraseRequest},
    state::DialogueState,
    steps::{get_step, split_steps},
    templates::TutorTemplates,
};

pub const EXIT_TOKENS: &[&str] = &["exit"];

pub const NEGATIVE_TOKENS: &[&str] = &[
    "no",
    "n",
    "nope",
    "nah",
    "not really",
    "no way",
    "no nahi",
    "nope.",
    "nah.",
    "no.",
    "not at all",
];

pub const AFFIRMATIVE_TOKENS: &[&str] = &["yes", "y"];

/// How the controller reads a user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Exit,
    Negative,
    Affirmative,
    Other,
}

impl Intent {
    /// Case-insensitive exact match after trimming.
    pub fn classify(input: &str) -> Self {
        let token = input.trim().to_lowercase();
        let token = token.as_str();
        if EXIT_TOKENS.contains(&token) {
            Self::Exit
        } else if NEGATIVE_TOKENS.contains(&token) {
            Self::Negative
        } else if AFFIRMATIVE_TOKENS.contains(&token) {
            Self::Affirmative
        } else {
            Self::Other
        }
    }
}

/// Transition taken by a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnAction {
    /// First question selected from the user's query.
    Started,
    /// Query found nothing; state unchanged.
    NoMatch,
    Exit,
    Rephrased,
    RephraseFallback,
    Advanced,
    NewQuestion,
    /// Every question has been asked; state reset.
    Completed,
    OpenEnded,
    OpenEndedFallback,
}

impl TurnAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::NoMatch => "no_match",
            Self::Exit => "exit",
            Self::Rephrased => "rephrased",
            Self::RephraseFallback => "rephrase_fallback",
            Self::Advanced => "advanced",
            Self::NewQuestion => "new_question",
            Self::Completed => "completed",
            Self::OpenEnded => "open_ended",
            Self::OpenEndedFallback => "open_ended_fallback",
        }
    }
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub response: String,
    pub state: DialogueState,
    pub action: TurnAction,
}

#[derive(Debug, Clone, Copy)]
enum RephraseKind {
    Confused,
    OffScript,
}

/// Dialogue engine shared by all requests.
pub struct TurnController {
    index: Arc<CorpusIndex>,
    gateway: Arc<dyn RephraseGateway>,
    templates: TutorTemplates,
    rephrase_timeout: Duration,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for TurnController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnController")
            .field("index", &self.index)
            .field("gateway", &self.gateway.name())
            .field("rephrase_timeout", &self.rephrase_timeout)
            .finish_non_exhaustive()
    }
}

impl TurnController {
    /// Controller with default templates, a 60 s rephrase timeout and an
    /// OS-seeded RNG.
    pub fn new(index: Arc<CorpusIndex>, gateway: Arc<dyn RephraseGateway>) -> Self {
        Self {
            index,
            gateway,
            templates: TutorTemplates::default(),
            rephrase_timeout: DEFAULT_REPHRASE_TIMEOUT,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Applies timeout, seed and template overrides from `cfg`.
    ///
    /// # Errors
    /// [`FlowError`] if the templates file cannot be read or parsed.
    pub fn from_config(
        index: Arc<CorpusIndex>,
        gateway: Arc<dyn RephraseGateway>,
        cfg: &FlowConfig,
    ) -> Result<Self, FlowError> {
        let mut ctl = Self::new(index, gateway).with_rephrase_timeout(cfg.rephrase_timeout);
        if let Some(seed) = cfg.rng_seed {
            ctl = ctl.with_rng_seed(seed);
        }
        if let Some(path) = &cfg.templates_path {
            ctl = ctl.with_templates(TutorTemplates::load(path)?);
        }
        Ok(ctl)
    }

    pub fn with_templates(mut self, templates: TutorTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_rephrase_timeout(mut self, timeout: Duration) -> Self {
        self.rephrase_timeout = timeout;
        self
    }

    /// Makes question draws reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    pub fn templates(&self) -> &TutorTemplates {
        &self.templates
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    /// Runs one turn. Never fails: every error path yields a fixed response
    /// and a valid state.
    pub async fn turn(&self, user_input: &str, state: &DialogueState) -> TurnOutcome {
        let state = state.sanitized(|id| self.index.contains(id));
        let intent = Intent::classify(user_input);

        let outcome = match intent {
            Intent::Exit => TurnOutcome {
                response: self.templates.farewell.clone(),
                state: DialogueState::new(),
                action: TurnAction::Exit,
            },
            _ if !state.has_active_question() => self.start(user_input, state).await,
            Intent::Negative => {
                self.rephrase(user_input, state, RephraseKind::Confused)
                    .await
            }
            Intent::Affirmative => self.advance(state),
            Intent::Other => {
                self.rephrase(user_input, state, RephraseKind::OffScript)
                    .await
            }
        };

        info!(
            action = outcome.action.as_str(),
            intent = ?intent,
            step_index = outcome.state.step_index,
            steps = outcome.state.current_steps.len(),
            asked = outcome.state.asked_ids.len(),
            "turn handled"
        );
        outcome
    }

    async fn start(&self, user_input: &str, state: DialogueState) -> TurnOutcome {
        let hit = match self.index.search(user_input.trim(), 1).await {
            Ok(hits) => hits.into_iter().next(),
            Err(e) => {
                warn!(error = %e, "query embedding failed");
                None
            }
        };

        let Some(hit) = hit else {
            return self.no_match(state);
        };
        debug!(id = hit.entry.id, distance = hit.distance, "query matched");

        match self.begin_question(hit.entry, state.clone()) {
            Some((steps_state, first)) => TurnOutcome {
                response: self.templates.first_step(&first),
                state: steps_state,
                action: TurnAction::Started,
            },
            None => self.no_match(state),
        }
    }

    fn no_match(&self, state: DialogueState) -> TurnOutcome {
        TurnOutcome {
            response: self.templates.no_match.clone(),
            state,
            action: TurnAction::NoMatch,
        }
    }

    /// Points `state` at the first step of `entry` and marks it asked.
    ///
    /// Returns `None` for an answer without any step text.
    fn begin_question(
        &self,
        entry: &CorpusEntry,
        mut state: DialogueState,
    ) -> Option<(DialogueState, String)> {
        let steps = split_steps(&entry.answer);
        if steps.is_empty() {
            warn!(id = entry.id, "corpus answer has no steps");
            return None;
        }
        let first = get_step(&steps, 0).to_string();

        state.asked_ids.insert(entry.id);
        state.step_index = 0;
        state.current_steps = steps;
        state.current_question = Some(entry.question.clone());
        Some((state, first))
    }

    fn advance(&self, mut state: DialogueState) -> TurnOutcome {
        let next = state.step_index + 1;
        if next < state.current_steps.len() {
            let response = self
                .templates
                .with_prompt(get_step(&state.current_steps, next));
            state.step_index = next;
            return TurnOutcome {
                response,
                state,
                action: TurnAction::Advanced,
            };
        }
        self.next_question(state)
    }

    /// Draws until an entry with at least one step comes up. Step-less
    /// entries are marked asked so they are never drawn again.
    fn next_question(&self, mut state: DialogueState) -> TurnOutcome {
        while let Some(entry) = self.draw_unasked(&state.asked_ids) {
            match self.begin_question(entry, state.clone()) {
                Some((next, first)) => {
                    return TurnOutcome {
                        response: self.templates.next_question(&entry.question, &first),
                        state: next,
                        action: TurnAction::NewQuestion,
                    };
                }
                None => {
                    state.asked_ids.insert(entry.id);
                }
            }
        }

        info!("all questions asked; resetting session");
        TurnOutcome {
            response: self.templates.completed.clone(),
            state: DialogueState::new(),
            action: TurnAction::Completed,
        }
    }

    /// Uniform draw over corpus entries whose id is not in `asked`.
    fn draw_unasked(&self, asked: &BTreeSet<usize>) -> Option<&CorpusEntry> {
        let available: Vec<&CorpusEntry> = self
            .index
            .entries()
            .iter()
            .filter(|e| !asked.contains(&e.id))
            .collect();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        available.choose(&mut *rng).copied()
    }

    async fn rephrase(
        &self,
        user_input: &str,
        state: DialogueState,
        kind: RephraseKind,
    ) -> TurnOutcome {
        let result = self
            .call_gateway(RephraseRequest {
                previous_step: get_step(&state.current_steps, state.step_index),
                question: state.current_question.as_deref(),
                user_input,
                recent_user_inputs: state.recent_turns.user_inputs(),
                recent_tutor_outputs: state.recent_turns.tutor_outputs(),
            })
            .await;

        let (text, action) = match (result, kind) {
            (Ok(text), RephraseKind::Confused) => (text, TurnAction::Rephrased),
            (Ok(text), RephraseKind::OffScript) => (text, TurnAction::OpenEnded),
            (Err(e), kind) => {
                warn!(
                    gateway = self.gateway.name(),
                    error = %e,
                    "rephrase failed; using fallback"
                );
                match kind {
                    RephraseKind::Confused => (
                        self.templates.rephrase_fallback.clone(),
                        TurnAction::RephraseFallback,
                    ),
                    RephraseKind::OffScript => (
                        self.templates.open_ended_fallback.clone(),
                        TurnAction::OpenEndedFallback,
                    ),
                }
            }
        };

        TurnOutcome {
            response: self.templates.with_prompt(&text),
            state,
            action,
        }
    }

    /// One bounded attempt; blank output counts as a failure.
    async fn call_gateway(&self, request: RephraseRequest<'_>) -> Result<String, GatewayError> {
        match tokio::time::timeout(self.rephrase_timeout, self.gateway.rephrase(request)).await {
            Err(_) => Err(GatewayError::Timeout(self.rephrase_timeout)),
            Ok(Err(e)) => Err(e),
            Ok(Ok(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    Err(GatewayError::Empty)
                } else {
                    Ok(text.to_string())
                }
            }
        }
    }
}
