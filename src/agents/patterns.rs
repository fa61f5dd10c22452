// file: src/agents/patterns.rs
// description: compiled regex patterns for cleaning model output
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Reasoning models (deepseek-r1 and similar) prefix answers with a think block
    pub static ref THINK_BLOCK: Regex = Regex::new(
        r"(?s)<think>.*?</think>"
    ).expect("THINK_BLOCK regex is valid");

    // The reviewer's sign-off, matched against uppercased text; word
    // boundaries keep INCOMPLETE from matching
    pub static ref COMPLETE_MARKER: Regex = Regex::new(
        r"\bCOMPLETE\b"
    ).expect("COMPLETE_MARKER regex is valid");
}

pub fn strip_think_blocks(text: &str) -> String {
    THINK_BLOCK.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_think_blocks() {
        let text = "<think>\nthe sender is the contractor\n</think>\n{\"a\": 1}";
        assert_eq!(strip_think_blocks(text), "{\"a\": 1}");
        assert_eq!(strip_think_blocks("plain"), "plain");
    }

    #[test]
    fn test_complete_marker() {
        assert!(COMPLETE_MARKER.is_match("COMPLETE"));
        assert!(COMPLETE_MARKER.is_match("Review result: COMPLETE."));
        assert!(!COMPLETE_MARKER.is_match("The extraction is INCOMPLETE"));
        assert!(!COMPLETE_MARKER.is_match("COMPLETENESS CHECK failed"));
    }
}
