//! Derived-Artifact Generator Integration Tests
//!
//! Flash cards and quiz questions: validation, persistence, and the
//! all-or-nothing batch policy.

mod common;

use std::sync::atomic::Ordering;

use uuid::Uuid;

use common::Fakes;
use lectern::domain::{NewResource, ResourceType};
use lectern::generate::{generate_flash_cards, generate_quiz_questions};
use lectern::store::{RecordStore, SqliteStore};

fn store_with_transcript(transcript: &str) -> (SqliteStore, Uuid, Uuid) {
    let store = SqliteStore::open_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let resource = store
        .create_resource(NewResource::new(owner, ResourceType::PlainText).with_content(transcript))
        .unwrap();
    (store, resource.id, owner)
}

#[tokio::test]
async fn flash_cards_persist_from_a_valid_response() {
    let (store, resource_id, owner) = store_with_transcript("the cell is the unit of life");
    let fakes = Fakes::new();
    *fakes.generator.text_response.lock().unwrap() = Some(
        r#"[
            {"front": "What is the basic unit of life?", "back": "The cell."},
            {"front": "Who coined the term cell?", "back": "Robert Hooke."}
        ]"#
        .into(),
    );

    let count = generate_flash_cards(&store, &fakes.backends(), resource_id, owner)
        .await
        .unwrap();

    assert_eq!(count, 2);
    let cards = store.flash_cards(resource_id, owner).unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|c| c.resource_id == resource_id && c.owner_id == owner));
}

#[tokio::test]
async fn missing_transcript_skips_generation_without_a_backend_call() {
    let store = SqliteStore::open_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let resource = store
        .create_resource(NewResource::new(owner, ResourceType::PlainText))
        .unwrap();
    let fakes = Fakes::new();

    let count = generate_flash_cards(&store, &fakes.backends(), resource.id, owner)
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert_eq!(fakes.generator.text_calls.load(Ordering::SeqCst), 0);
    assert!(store.flash_cards(resource.id, owner).unwrap().is_empty());
}

#[tokio::test]
async fn unparseable_response_produces_zero_cards() {
    let (store, resource_id, owner) = store_with_transcript("content");
    let fakes = Fakes::new();
    *fakes.generator.text_response.lock().unwrap() =
        Some("Here are some flash cards for you!".into());

    let count = generate_flash_cards(&store, &fakes.backends(), resource_id, owner)
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert!(store.flash_cards(resource_id, owner).unwrap().is_empty());
}

#[tokio::test]
async fn fenced_response_still_parses() {
    let (store, resource_id, owner) = store_with_transcript("content");
    let fakes = Fakes::new();
    *fakes.generator.text_response.lock().unwrap() =
        Some("```json\n[{\"front\": \"F\", \"back\": \"B\"}]\n```".into());

    let count = generate_flash_cards(&store, &fakes.backends(), resource_id, owner)
        .await
        .unwrap();

    assert_eq!(count, 1);
}

#[tokio::test]
async fn invalid_quiz_items_are_filtered_but_valid_ones_persist() {
    let (store, resource_id, owner) = store_with_transcript("content");
    let fakes = Fakes::new();
    *fakes.generator.text_response.lock().unwrap() = Some(
        r#"[
            {"question": "Three options", "options": ["a", "b", "c"], "correct_option": "a"},
            {"question": "Five options", "options": ["a", "b", "c", "d", "e"], "correct_option": "a"},
            {"question": "Answer not present", "options": ["a", "b", "c", "d"], "correct_option": "z"},
            {"question": "Valid", "options": ["a", "b", "c", "d"], "correct_option": "c"}
        ]"#
        .into(),
    );

    let count = generate_quiz_questions(&store, &fakes.backends(), resource_id, owner)
        .await
        .unwrap();

    assert_eq!(count, 1);
    let questions = store.quiz_questions(resource_id, owner).unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].question, "Valid");
    assert_eq!(questions[0].options, ["a", "b", "c", "d"]);
    assert_eq!(questions[0].correct_option, "c");
}

#[tokio::test]
async fn quiz_options_survive_a_storage_round_trip() {
    let (store, resource_id, owner) = store_with_transcript("content");
    let fakes = Fakes::new();
    *fakes.generator.text_response.lock().unwrap() = Some(
        r#"[{
            "question": "Ordered?",
            "options": ["first", "second", "third", "fourth"],
            "correct_option": "second"
        }]"#
        .into(),
    );

    generate_quiz_questions(&store, &fakes.backends(), resource_id, owner)
        .await
        .unwrap();

    let questions = store.quiz_questions(resource_id, owner).unwrap();
    assert_eq!(questions[0].options, ["first", "second", "third", "fourth"]);
}

#[tokio::test]
async fn generation_backend_failure_propagates_to_the_caller() {
    let (store, resource_id, owner) = store_with_transcript("content");
    let fakes = Fakes::new();
    *fakes.generator.text_response.lock().unwrap() = None;

    let result = generate_flash_cards(&store, &fakes.backends(), resource_id, owner).await;

    assert!(result.is_err());
    assert!(store.flash_cards(resource_id, owner).unwrap().is_empty());
}

#[tokio::test]
async fn unknown_resource_is_an_error() {
    let store = SqliteStore::open_in_memory().unwrap();
    let fakes = Fakes::new();

    let result =
        generate_quiz_questions(&store, &fakes.backends(), Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn generators_for_the_same_resource_run_concurrently() {
    let (store, resource_id, owner) = store_with_transcript("shared transcript");
    let fakes = Fakes::new();
    *fakes.generator.text_response.lock().unwrap() = Some(
        r#"[{"front": "F", "back": "B"},
            {"question": "Q?", "options": ["a", "b", "c", "d"], "correct_option": "a"}]"#
            .into(),
    );
    let backends = fakes.backends();

    // The same payload parses differently per generator: the card item is
    // dropped by quiz validation and vice versa.
    let (cards, questions) = tokio::join!(
        generate_flash_cards(&store, &backends, resource_id, owner),
        generate_quiz_questions(&store, &backends, resource_id, owner),
    );

    assert_eq!(cards.unwrap(), 1);
    assert_eq!(questions.unwrap(), 1);
}
