use crate::constants::{RESULT_CLOSE, RESULT_OPEN};
use crate::domain::{Role, Turn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalAnswer {
    /// Position of the selected turn in the scanned stream.
    pub turn_index: usize,
    /// True when the turn had no visible text and the answer comes from its thoughts.
    pub from_thoughts: bool,
    pub text: String,
}

/// Picks the last assistant turn carrying text and extracts its answer.
pub fn select_final_answer(turns: &[Turn]) -> Option<FinalAnswer> {
    turns
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, turn)| turn.role == Role::Assistant)
        .find_map(|(index, turn)| {
            let answer = turn.answer_texts();
            let from_thoughts = answer.is_empty();
            let texts = if from_thoughts {
                turn.thought_texts()
            } else {
                answer
            };
            if texts.is_empty() {
                return None;
            }
            Some(FinalAnswer {
                turn_index: index,
                from_thoughts,
                text: extract_result_span(&texts.join("\n")),
            })
        })
}

/// Returns the inner `<result>` span when present, else the trimmed text.
pub fn extract_result_span(text: &str) -> String {
    if let Some(start) = text.find(RESULT_OPEN) {
        let inner = &text[start + RESULT_OPEN.len()..];
        if let Some(end) = inner.find(RESULT_CLOSE) {
            return inner[..end].trim().to_string();
        }
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentBlock;
    use serde_json::json;

    #[test]
    fn result_span_is_extracted() {
        assert_eq!(extract_result_span("<result>42</result>"), "42");
        assert_eq!(
            extract_result_span("Computed.\n<result>\n 96 \n</result> bye"),
            "96"
        );
    }

    #[test]
    fn text_without_delimiter_is_trimmed() {
        assert_eq!(extract_result_span("  The answer is 42 \n"), "The answer is 42");
        assert_eq!(extract_result_span("<result>unterminated"), "<result>unterminated");
    }

    #[test]
    fn no_assistant_text_means_no_answer() {
        let turns = vec![
            Turn::user("list files"),
            Turn::assistant(vec![ContentBlock::ToolUse {
                id: None,
                name: "list_files".into(),
                arguments: vec![],
            }]),
            Turn::assistant(vec![ContentBlock::text("   ")]),
        ];
        assert_eq!(select_final_answer(&turns), None);
        assert_eq!(select_final_answer(&[]), None);
    }

    #[test]
    fn last_assistant_text_turn_wins() {
        let turns = vec![
            Turn::assistant(vec![ContentBlock::text("first")]),
            Turn::user("more"),
            Turn::assistant(vec![ContentBlock::text("<result>second</result>")]),
            Turn::assistant(vec![ContentBlock::ToolUse {
                id: None,
                name: "add".into(),
                arguments: vec![("a".into(), json!(1))],
            }]),
        ];
        let answer = select_final_answer(&turns).expect("answer");
        assert_eq!(answer.turn_index, 2);
        assert_eq!(answer.text, "second");
    }

    #[test]
    fn non_thought_text_is_preferred_but_thoughts_still_count() {
        let mixed = vec![Turn::assistant(vec![
            ContentBlock::thought("reasoning"),
            ContentBlock::text("visible"),
        ])];
        let answer = select_final_answer(&mixed).expect("answer");
        assert_eq!(answer.text, "visible");
        assert!(!answer.from_thoughts);

        let thought_only = vec![Turn::assistant(vec![ContentBlock::thought("only this")])];
        let answer = select_final_answer(&thought_only).expect("answer");
        assert_eq!(answer.text, "only this");
        assert!(answer.from_thoughts);
    }
}
