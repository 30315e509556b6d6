use serde::{Deserialize, Serialize};
use tutor_flow::{DialogueState, TurnAction};

/// Response payload for POST /chat.
///
/// All fields but `response` and `action` form the next request's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub step_index: usize,
    pub current_steps: Vec<String>,
    pub current_question: Option<String>,
    /// Sorted ascending.
    pub asked_ids: Vec<usize>,
    /// Includes this turn; at most three.
    pub recent_user_inputs: Vec<String>,
    pub recent_tutor_outputs: Vec<String>,
    pub action: TurnAction,
}

impl ChatResponse {
    pub fn new(response: String, state: DialogueState, action: TurnAction) -> Self {
        let recent_user_inputs = state
            .recent_turns
            .user_inputs()
            .into_iter()
            .map(String::from)
            .collect();
        let recent_tutor_outputs = state
            .recent_turns
            .tutor_outputs()
            .into_iter()
            .map(String::from)
            .collect();

        Self {
            response,
            step_index: state.step_index,
            current_steps: state.current_steps,
            current_question: state.current_question,
            asked_ids: state.asked_ids.into_iter().collect(),
            recent_user_inputs,
            recent_tutor_outputs,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_state() {
        let mut state = DialogueState {
            step_index: 1,
            current_steps: vec!["Step 1: a".into(), "Step 2: b".into()],
            current_question: Some("q".into()),
            asked_ids: [5, 2].into_iter().collect(),
            ..DialogueState::default()
        };
        state.record_turn("yes", "Step 2: b");

        let v = serde_json::to_value(ChatResponse::new("Step 2: b".into(), state, TurnAction::Advanced))
            .unwrap();
        assert_eq!(v["asked_ids"], serde_json::json!([2, 5]));
        assert_eq!(v["recent_user_inputs"], serde_json::json!(["yes"]));
        assert_eq!(v["action"], "advanced");
        assert_eq!(v["current_question"], "q");
    }
}
