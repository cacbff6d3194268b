//! Flash card generation.

use anyhow::Result;
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::Backends;
use crate::domain::NewFlashCard;
use crate::store::RecordStore;

use super::strip_code_fences;

const FLASH_CARD_PROMPT: &str = "\
You are a helpful tutor creating flash cards for a student to help them learn and review \
material.

You will be given text content (transcript, notes, or document content) and should generate \
flash cards based on the key concepts, facts, and important information presented.

Each flash card should have:
- A clear, concise question or prompt on the front
- A comprehensive but focused answer on the back

Generate flash cards that test understanding of:
- Key concepts and definitions
- Important facts and figures
- Cause and effect relationships
- Examples and applications
- Critical thinking about the material

Return your response as a JSON array of flash card objects, where each object has \"front\" \
and \"back\" fields.
Example format:
[
  {
    \"front\": \"What is the main concept discussed in the material?\",
    \"back\": \"The main concept is...\"
  },
  {
    \"front\": \"Define [key term]\",
    \"back\": \"[Definition and explanation]\"
  }
]

Generate 8-12 high-quality flash cards based on the content. Focus on the most important and \
testable information.";

/// Parse a generation response into validated flash cards.
///
/// Items missing a non-empty front or back are skipped with a warning;
/// anything other than a JSON array is a parse error.
pub fn parse_flash_cards(payload: &str) -> Result<Vec<NewFlashCard>, serde_json::Error> {
    let items: Vec<Value> = serde_json::from_str(strip_code_fences(payload))?;

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let front = item.get("front").and_then(Value::as_str).unwrap_or("").trim();
            let back = item.get("back").and_then(Value::as_str).unwrap_or("").trim();

            if front.is_empty() || back.is_empty() {
                warn!(%item, "skipping invalid flash card");
                return None;
            }

            Some(NewFlashCard {
                front: front.to_string(),
                back: back.to_string(),
            })
        })
        .collect())
}

/// Generate flash cards for a resource from its transcript.
///
/// Returns how many cards were persisted. A missing transcript or an
/// unparseable response produces zero cards without failing the call; a
/// mid-batch persistence error rolls the whole batch back.
#[instrument(skip(store, backends), fields(%resource_id))]
pub async fn generate_flash_cards(
    store: &dyn RecordStore,
    backends: &Backends,
    resource_id: Uuid,
    owner_id: Uuid,
) -> Result<usize> {
    let resource = store.resource(resource_id, owner_id)?;

    let transcript = match store.transcript(resource.id, owner_id)? {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            warn!("no transcript available, cannot generate flash cards");
            return Ok(0);
        }
    };

    info!("generating flash cards");
    let raw = backends.generator.generate(FLASH_CARD_PROMPT, &transcript).await?;

    let cards = match parse_flash_cards(&raw) {
        Ok(cards) => cards,
        Err(e) => {
            error!(error = %e, "flash card response was not a valid JSON array");
            return Ok(0);
        }
    };

    if cards.is_empty() {
        warn!("no valid flash cards in response");
        return Ok(0);
    }

    match store.insert_flash_cards(resource.id, owner_id, &cards) {
        Ok(count) => {
            info!(count, "flash cards saved");
            Ok(count)
        }
        Err(e) => {
            // The store rolled the batch back; nothing was kept.
            error!(error = %e, "failed to persist flash card batch");
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_cards() {
        let payload = r#"[
            {"front": "What is osmosis?", "back": "Diffusion of water across a membrane."},
            {"front": "Define ATP", "back": "The cell's energy currency."}
        ]"#;

        let cards = parse_flash_cards(payload).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].front, "What is osmosis?");
    }

    #[test]
    fn skips_items_with_missing_or_blank_sides() {
        let payload = r#"[
            {"front": "Kept", "back": "Yes"},
            {"front": "", "back": "No front"},
            {"front": "No back"},
            {"unrelated": true}
        ]"#;

        let cards = parse_flash_cards(payload).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front, "Kept");
    }

    #[test]
    fn fenced_payloads_parse() {
        let payload = "```json\n[{\"front\": \"F\", \"back\": \"B\"}]\n```";
        assert_eq!(parse_flash_cards(payload).unwrap().len(), 1);
    }

    #[test]
    fn non_array_payload_is_a_parse_error() {
        assert!(parse_flash_cards(r#"{"front": "F", "back": "B"}"#).is_err());
        assert!(parse_flash_cards("The material covers...").is_err());
    }

    #[test]
    fn sides_are_trimmed() {
        let payload = r#"[{"front": "  Q  ", "back": "  A  "}]"#;
        let cards = parse_flash_cards(payload).unwrap();
        assert_eq!(cards[0].front, "Q");
        assert_eq!(cards[0].back, "A");
    }
}
