//! Splitting answers into teaching steps.
//!
//! A step starts at the literal marker `"Step "` when it appears at a token
//! boundary (start of text or after whitespace). Marker chunks keep their
//! `"Step "` prefix; text before the first marker becomes its own leading step
//! as-is. Chunks are trimmed and blank chunks are dropped.

/// Step boundary marker. Case-sensitive.
pub const STEP_MARKER: &str = "Step ";

/// Splits `answer` into ordered steps.
///
/// Content is never dropped or reordered: `steps.join(" ")` equals `answer`
/// modulo whitespace. Empty or whitespace-only input yields `[]`.
///
/// # Example
/// ```
/// use tutor_flow::steps::split_steps;
/// let steps = split_steps("Let's see. Step 1: Add 7. Step 2: Get 12.");
/// assert_eq!(steps, vec!["Let's see.", "Step 1: Add 7.", "Step 2: Get 12."]);
/// ```
pub fn split_steps(answer: &str) -> Vec<String> {
    let mut cuts: Vec<usize> = answer
        .match_indices(STEP_MARKER)
        .map(|(i, _)| i)
        .filter(|&i| {
            answer[..i]
                .chars()
                .next_back()
                .is_none_or(char::is_whitespace)
        })
        .collect();

    if cuts.first() != Some(&0) {
        cuts.insert(0, 0);
    }
    cuts.push(answer.len());

    cuts.windows(2)
        .map(|w| answer[w[0]..w[1]].trim())
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Returns the step at `idx`, or `""` past the end.
pub fn get_step(steps: &[String], idx: usize) -> &str {
    steps.get(idx).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn normalize(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn two_marked_steps() {
        let steps = split_steps("Step 1: Start with 7. Step 2: Count up 5 more to reach 12.");
        assert_eq!(
            steps,
            vec![
                "Step 1: Start with 7.",
                "Step 2: Count up 5 more to reach 12."
            ]
        );
    }

    #[test]
    fn leading_fragment_is_its_own_step() {
        let steps = split_steps("First, read carefully.\nStep 1: Multiply. Step 2: Check.");
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0], "First, read carefully.");
        assert_eq!(steps[1], "Step 1: Multiply.");
    }

    #[test]
    fn no_marker_is_single_step() {
        assert_eq!(split_steps("  The answer is 12.  "), vec!["The answer is 12."]);
    }

    #[test]
    fn marker_inside_a_word_does_not_split() {
        let steps = split_steps("Step 1: Take a MiniStep forward. FootStep 2 is not a marker.");
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn lowercase_marker_does_not_split() {
        assert_eq!(split_steps("step 1: a step 2: b").len(), 1);
    }

    #[test]
    fn empty_answer_has_no_steps() {
        assert!(split_steps("").is_empty());
        assert!(split_steps(" \n\t ").is_empty());
    }

    #[test]
    fn get_step_out_of_range_is_empty() {
        let steps = split_steps("Step 1: a Step 2: b");
        assert_eq!(get_step(&steps, 1), "Step 2: b");
        assert_eq!(get_step(&steps, 2), "");
        assert_eq!(get_step(&steps, usize::MAX), "");
        assert_eq!(get_step(&[], 0), "");
    }

    proptest! {
        #[test]
        fn rejoin_preserves_content(
            parts in prop::collection::vec(
                prop_oneof![
                    Just("Step ".to_string()),
                    Just("Step 1: ".to_string()),
                    Just("\n".to_string()),
                    Just("  ".to_string()),
                    "[a-zA-Z0-9:.+=]{1,8}",
                ],
                0..24,
            )
        ) {
            let answer: String = parts.concat();
            let steps = split_steps(&answer);
            prop_assert_eq!(normalize(&steps.join(" ")), normalize(&answer));
            for s in &steps {
                prop_assert!(!s.trim().is_empty());
            }
            prop_assert_eq!(steps.is_empty(), answer.trim().is_empty());
        }

        #[test]
        fn every_later_step_starts_with_marker(
            body in "[a-z ]{0,20}",
            n in 1usize..6,
        ) {
            let answer: String = (1..=n).map(|i| format!("Step {i}: {body} ")).collect();
            let steps = split_steps(&answer);
            prop_assert_eq!(steps.len(), n);
            for s in &steps {
                prop_assert!(s.starts_with(STEP_MARKER));
            }
        }
    }
}
