//! Summary notes generation.
//!
//! Turns a transcript into condensed study notes plus a representative
//! emoji via a structured-output generation call. Non-critical: every
//! failure is logged and leaves the resource untouched so a later run can
//! retry.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::adapters::Backends;
use crate::domain::Resource;
use crate::store::RecordStore;

const SUMMARIZE_PROMPT: &str = "\
You are a tutor that is helping a student learn.
You will be given a string of text by the student. This text may be the transcript of a \
lecture, a book, or another document the student wants to learn from.
Your job is to provide summary notes in markdown format for the student to learn from.
The summary should cover all the key points and main ideas presented in the original text, \
while condensing the information into a concise and easy-to-understand format. Include the \
relevant details and examples that support the main ideas, avoid repetition, and do not omit \
any important information.
Also pick a single emoji that best represents the material.
Respond with the summary and the emoji only.";

#[derive(Debug, Deserialize)]
struct SummaryPayload {
    summary: String,
    emoji: String,
}

fn summary_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string" },
            "emoji": { "type": "string" },
        },
        "required": ["summary", "emoji"],
        "additionalProperties": false,
    })
}

/// Generate and persist summary notes for a resource.
///
/// Idempotent: a resource that already has notes is left alone without a
/// backend call. Never propagates an error.
pub async fn summarize(store: &dyn RecordStore, backends: &Backends, resource: &Resource) {
    if resource
        .summary_notes
        .as_deref()
        .is_some_and(|notes| !notes.trim().is_empty())
    {
        debug!(resource_id = %resource.id, "resource already has summary notes");
        return;
    }

    let transcript = match store.transcript(resource.id, resource.owner_id) {
        Ok(Some(t)) if !t.trim().is_empty() => t,
        Ok(_) => {
            warn!(resource_id = %resource.id, "no transcript available, cannot summarize");
            return;
        }
        Err(e) => {
            error!(resource_id = %resource.id, error = %e, "failed to load transcript");
            return;
        }
    };

    info!(resource_id = %resource.id, "generating summary notes");
    let raw = match backends
        .generator
        .generate_json(SUMMARIZE_PROMPT, &transcript, "study_summary", summary_schema())
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            error!(resource_id = %resource.id, error = %e, "summary generation failed");
            return;
        }
    };

    let payload: SummaryPayload = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            error!(resource_id = %resource.id, error = %e, "summary response was not valid JSON");
            return;
        }
    };

    let notes = payload.summary.trim();
    if notes.is_empty() {
        error!(resource_id = %resource.id, "generator returned an empty summary");
        return;
    }

    let glyph = payload.emoji.trim();
    let glyph = (!glyph.is_empty()).then_some(glyph);

    if let Err(e) = store.set_summary(resource.id, resource.owner_id, notes, glyph) {
        error!(resource_id = %resource.id, error = %e, "failed to persist summary notes");
        return;
    }

    info!(resource_id = %resource.id, chars = notes.len(), "summary notes saved");
}
