//! Multiple-choice quiz generation.

use anyhow::Result;
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::Backends;
use crate::domain::NewQuizQuestion;
use crate::store::RecordStore;

use super::strip_code_fences;

const QUIZ_PROMPT: &str = "\
You are a helpful tutor creating multiple choice quiz questions for a student to help them \
test their understanding of the material.

You will be given text content (transcript, notes, or document content) and should generate \
multiple choice questions based on the key concepts, facts, and important information \
presented.

Each question should have:
- A clear, specific question
- 4 multiple choice options
- Only one correct answer
- Plausible distractors (incorrect options that seem reasonable)

Generate questions that test:
- Key concepts and definitions
- Important facts and figures
- Cause and effect relationships
- Applications and examples
- Analysis and critical thinking

Return your response as a JSON array of question objects, where each object has \"question\", \
\"options\", and \"correct_option\" fields.
The \"options\" field should be an array of 4 strings (the answer choices).
The \"correct_option\" field should be the exact text of the correct answer, not a letter.

Example format:
[
  {
    \"question\": \"What is the main concept discussed in the material?\",
    \"options\": [
      \"Option A description\",
      \"Option B description\",
      \"Option C description\",
      \"Option D description\"
    ],
    \"correct_option\": \"Option B description\"
  }
]

Generate 8-12 high-quality multiple choice questions based on the content. Focus on the most \
important and testable information.";

/// Exactly this many options per question.
const OPTION_COUNT: usize = 4;

/// Parse a generation response into validated quiz questions.
///
/// An item is kept only when it has a non-empty question, exactly 4
/// options, and a `correct_option` that is verbatim one of them.
pub fn parse_quiz_items(payload: &str) -> Result<Vec<NewQuizQuestion>, serde_json::Error> {
    let items: Vec<Value> = serde_json::from_str(strip_code_fences(payload))?;

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let question = item
                .get("question")
                .and_then(Value::as_str)
                .unwrap_or("")
                .trim();
            if question.is_empty() {
                warn!(%item, "skipping quiz item without a question");
                return None;
            }

            let options: Vec<String> = match item.get("options").and_then(Value::as_array) {
                Some(values) => values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                None => {
                    warn!(%item, "skipping quiz item without options");
                    return None;
                }
            };
            if options.len() != OPTION_COUNT {
                warn!(%item, "skipping quiz item without exactly 4 options");
                return None;
            }

            let correct_option = match item.get("correct_option").and_then(Value::as_str) {
                Some(correct) => correct.to_string(),
                None => {
                    warn!(%item, "skipping quiz item without a correct option");
                    return None;
                }
            };
            if !options.iter().any(|option| option == &correct_option) {
                warn!(%item, "skipping quiz item whose correct option is not among the options");
                return None;
            }

            Some(NewQuizQuestion {
                question: question.to_string(),
                options,
                correct_option,
            })
        })
        .collect())
}

/// Generate quiz questions for a resource from its transcript.
///
/// Same contract as flash card generation: zero artifacts on missing
/// transcript, parse failure, or a rolled-back batch.
#[instrument(skip(store, backends), fields(%resource_id))]
pub async fn generate_quiz_questions(
    store: &dyn RecordStore,
    backends: &Backends,
    resource_id: Uuid,
    owner_id: Uuid,
) -> Result<usize> {
    let resource = store.resource(resource_id, owner_id)?;

    let transcript = match store.transcript(resource.id, owner_id)? {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            warn!("no transcript available, cannot generate quiz questions");
            return Ok(0);
        }
    };

    info!("generating quiz questions");
    let raw = backends.generator.generate(QUIZ_PROMPT, &transcript).await?;

    let questions = match parse_quiz_items(&raw) {
        Ok(questions) => questions,
        Err(e) => {
            error!(error = %e, "quiz response was not a valid JSON array");
            return Ok(0);
        }
    };

    if questions.is_empty() {
        warn!("no valid quiz questions in response");
        return Ok(0);
    }

    match store.insert_quiz_questions(resource.id, owner_id, &questions) {
        Ok(count) => {
            info!(count, "quiz questions saved");
            Ok(count)
        }
        Err(e) => {
            error!(error = %e, "failed to persist quiz question batch");
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(question: &str, options: &[&str], correct: &str) -> String {
        serde_json::json!({
            "question": question,
            "options": options,
            "correct_option": correct,
        })
        .to_string()
    }

    #[test]
    fn keeps_a_well_formed_question() {
        let payload = format!("[{}]", item("Q?", &["a", "b", "c", "d"], "b"));
        let questions = parse_quiz_items(&payload).unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options, ["a", "b", "c", "d"]);
        assert_eq!(questions[0].correct_option, "b");
    }

    #[test]
    fn rejects_wrong_option_counts() {
        let three = format!("[{}]", item("Q?", &["a", "b", "c"], "a"));
        let five = format!("[{}]", item("Q?", &["a", "b", "c", "d", "e"], "a"));

        assert!(parse_quiz_items(&three).unwrap().is_empty());
        assert!(parse_quiz_items(&five).unwrap().is_empty());
    }

    #[test]
    fn rejects_correct_option_not_verbatim_in_options() {
        let payload = format!("[{}]", item("Q?", &["alpha", "beta", "gamma", "delta"], "Beta"));
        assert!(parse_quiz_items(&payload).unwrap().is_empty());

        // Even trailing whitespace breaks the byte-for-byte match.
        let payload = format!("[{}]", item("Q?", &["alpha", "beta", "gamma", "delta"], "beta "));
        assert!(parse_quiz_items(&payload).unwrap().is_empty());
    }

    #[test]
    fn invalid_items_do_not_sink_valid_ones() {
        let payload = format!(
            "[{}, {}]",
            item("Bad", &["a", "b"], "a"),
            item("Good?", &["a", "b", "c", "d"], "d"),
        );

        let questions = parse_quiz_items(&payload).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Good?");
    }

    #[test]
    fn non_array_payload_is_a_parse_error() {
        assert!(parse_quiz_items("not json").is_err());
        assert!(parse_quiz_items(r#"{"question": "Q?"}"#).is_err());
    }

    #[test]
    fn fenced_payloads_parse() {
        let payload = format!("```json\n[{}]\n```", item("Q?", &["a", "b", "c", "d"], "a"));
        assert_eq!(parse_quiz_items(&payload).unwrap().len(), 1);
    }
}
