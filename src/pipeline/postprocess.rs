use std::sync::OnceLock;

use regex::Regex;

fn reasoning_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").expect("static regex"))
}

/// Removes every `<think>...</think>` span (shortest match, across newlines)
/// and trims the result. Unterminated markers are left untouched.
pub fn strip_reasoning_markup(text: &str) -> String {
    reasoning_block().replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_multiline_block_and_keeps_surrounding_spaces() {
        let input = "X <think>hidden reasoning spanning\nmultiple lines</think> Y";
        assert_eq!(strip_reasoning_markup(input), "X  Y");
    }

    #[test]
    fn clean_text_is_unchanged() {
        assert_eq!(
            strip_reasoning_markup("Drink water and rest."),
            "Drink water and rest."
        );
    }

    #[test]
    fn every_block_is_removed_non_greedily() {
        let input = "<think>a</think>keep<think>b</think> this";
        assert_eq!(strip_reasoning_markup(input), "keep this");
    }

    #[test]
    fn leading_block_leaves_trimmed_answer() {
        let input = "<think>combining sources</think>Dengue symptoms include fever.";
        assert_eq!(strip_reasoning_markup(input), "Dengue symptoms include fever.");
    }

    #[test]
    fn unterminated_marker_is_left_in_place() {
        let input = "  Answer <think>never closed ";
        assert_eq!(strip_reasoning_markup(input), "Answer <think>never closed");
    }
}
