//! Derived-artifact generators: flash cards and quiz questions.
//!
//! Both are triggered by the caller after ingestion completes, run
//! independently of each other, and only need a transcript. Failures here
//! never touch the resource's status; the worst case is zero artifacts.

pub mod flashcards;
pub mod quiz;

pub use flashcards::{generate_flash_cards, parse_flash_cards};
pub use quiz::{generate_quiz_questions, parse_quiz_items};

/// Strip optional markdown code-fence wrapping from a generation response.
pub(crate) fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        return rest.strip_suffix("```").unwrap_or(rest).trim();
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        return rest.strip_suffix("```").unwrap_or(rest).trim();
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("[1, 2]"), "[1, 2]");
    }
}
