use serde::Deserialize;
use tutor_flow::RawDialogueState;

/// Request payload for POST /chat.
///
/// Everything except `user_input` is the state returned by the previous turn;
/// a new session sends only `user_input`. Older clients' field names are
/// accepted as aliases.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_input: String,

    #[serde(default, alias = "step_idx")]
    pub step_index: i64,

    #[serde(default, alias = "last_steps")]
    pub current_steps: Vec<String>,

    #[serde(default, alias = "last_question")]
    pub current_question: Option<String>,

    #[serde(default, alias = "asked_indices")]
    pub asked_ids: Vec<i64>,

    #[serde(default, alias = "last_user_inputs")]
    pub recent_user_inputs: Vec<String>,

    #[serde(default, alias = "last_tutor_outputs")]
    pub recent_tutor_outputs: Vec<String>,
}

impl ChatRequest {
    /// Splits into the user's input and the unvalidated session state.
    pub fn into_parts(self) -> (String, RawDialogueState) {
        let state = RawDialogueState {
            step_index: self.step_index,
            current_steps: self.current_steps,
            current_question: self.current_question,
            asked_ids: self.asked_ids,
            recent_user_inputs: self.recent_user_inputs,
            recent_tutor_outputs: self.recent_tutor_outputs,
        };
        (self.user_input, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_user_input_is_required() {
        let req: ChatRequest = serde_json::from_str(r#"{"user_input": "hi"}"#).unwrap();
        let (input, state) = req.into_parts();
        assert_eq!(input, "hi");
        assert_eq!(state, RawDialogueState::default());
    }

    #[test]
    fn legacy_field_names() {
        let req: ChatRequest = serde_json::from_str(
            r#"{
                "user_input": "yes",
                "step_idx": 1,
                "last_steps": ["Step 1: a", "Step 2: b"],
                "last_question": "q",
                "asked_indices": [3],
                "last_user_inputs": ["q"],
                "last_tutor_outputs": ["Step 1: a"]
            }"#,
        )
        .unwrap();
        assert_eq!(req.step_index, 1);
        assert_eq!(req.current_steps.len(), 2);
        assert_eq!(req.asked_ids, vec![3]);
        assert_eq!(req.recent_tutor_outputs, vec!["Step 1: a"]);
    }

    #[test]
    fn negative_numbers_are_accepted() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"user_input": "no", "step_index": -4, "asked_ids": [-1, 2]}"#)
                .unwrap();
        assert_eq!(req.step_index, -4);
        assert_eq!(req.asked_ids, vec![-1, 2]);
    }
}
