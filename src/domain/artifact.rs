//! Study artifacts derived from a resource's transcript.
//!
//! Every artifact is owned by exactly one resource and one user; the
//! record store enforces that pairing on every read and write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A front/back flash card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashCard {
    pub id: i64,
    pub resource_id: Uuid,
    pub owner_id: Uuid,
    pub front: String,
    pub back: String,
    pub created_at: DateTime<Utc>,
}

/// A validated flash card awaiting persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlashCard {
    pub front: String,
    pub back: String,
}

/// A multiple-choice quiz question.
///
/// `options` always holds exactly 4 entries and `correct_option` is
/// verbatim one of them; both are enforced before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub resource_id: Uuid,
    pub owner_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: String,
    pub created_at: DateTime<Utc>,
}

/// A validated quiz question awaiting persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: String,
}

/// One uploaded image of an image-set resource, ordered by upload time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceImage {
    pub id: i64,
    pub resource_id: Uuid,
    pub owner_id: Uuid,
    pub image_locator: String,
    pub created_at: DateTime<Utc>,
}

/// Serialize an ordered option list for storage.
///
/// JSON keeps the round trip exact for arbitrary option text (a
/// newline-joined encoding would not).
pub fn options_to_json(options: &[String]) -> String {
    serde_json::to_string(options).unwrap_or_else(|_| "[]".to_string())
}

/// Reconstruct the ordered option list from its stored form.
pub fn options_from_json(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_round_trip_preserves_order() {
        let options = vec![
            "Mitochondria".to_string(),
            "Ribosome".to_string(),
            "Golgi apparatus".to_string(),
            "Nucleus".to_string(),
        ];

        let stored = options_to_json(&options);
        let restored = options_from_json(&stored);

        assert_eq!(restored, options);
        assert_eq!(restored.len(), 4);
    }

    #[test]
    fn options_round_trip_survives_awkward_text() {
        let options = vec![
            "Line one\nline two".to_string(),
            "Quote \"inside\"".to_string(),
            "Comma, separated".to_string(),
            "Plain".to_string(),
        ];

        assert_eq!(options_from_json(&options_to_json(&options)), options);
    }
}
