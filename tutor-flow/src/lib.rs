//! Dialogue engine of the math tutor.
//!
//! - [`steps`]: answer text to ordered teaching steps;
//! - [`state`]: client-owned [`DialogueState`] with sanitization;
//! - [`controller`]: the per-turn state machine;
//! - [`gateway`]: the generative-model seam used for rephrasing;
//! - [`templates`]: fixed response text.
//!
//! The engine keeps no per-session data. Everything a session needs travels
//! with the request, and the only shared pieces are the read-only corpus
//! index, the gateway and the RNG.

pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod state;
pub mod steps;
pub mod templates;

pub use config::FlowConfig;
pub use controller::{Intent, TurnAction, TurnController, TurnOutcome};
pub use error::FlowError;
pub use gateway::{GatewayError, LlmRephraseGateway, RephraseGateway, RephraseRequest, UnavailableGateway};
pub use state::{DialogueState, RawDialogueState, RecentTurns, Turn};
pub use steps::{get_step, split_steps};
pub use templates::TutorTemplates;
