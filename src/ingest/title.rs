//! Title generation.
//!
//! Two implementations share the slot: a text-derived title generated from
//! the opening of the summary notes, and a metadata-derived title fetched
//! from the video platform (used for web videos, where the platform
//! already knows the real name). Both are idempotent and non-critical.

use tracing::{debug, error, info, warn};

use crate::adapters::Backends;
use crate::domain::{Resource, ResourceType};
use crate::store::RecordStore;

const TITLE_PROMPT: &str = "\
You are helping to name documents based on text provided by the user.
The user will provide text and you should give the document a title based on the content.
It will only be the beginning of the text and may be cut off, so keep this in mind.
The title should be short and concise, like the title of an article.
Respond with the title only.";

/// Longest title we persist.
const TITLE_MAX_CHARS: usize = 200;

/// How much of the summary notes the generator sees.
const SAMPLE_CHARS: usize = 1500;

/// A sentence boundary earlier than this would cut too much away.
const MIN_BOUNDARY_CHARS: usize = 750;

/// How a resource type gets its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    /// Generated from the opening of the summary notes
    TextDerived,

    /// Taken from the video platform's metadata
    VideoMetadata,
}

/// Title source for a resource type. Video metadata takes precedence for
/// web videos; everything else derives from text.
pub fn source_for(resource_type: ResourceType) -> Option<TitleSource> {
    Some(match resource_type {
        ResourceType::WebVideoLink => TitleSource::VideoMetadata,
        _ => TitleSource::TextDerived,
    })
}

/// Generate and persist a title for a resource.
///
/// No-op when a title is already set. Never propagates an error.
pub async fn generate(store: &dyn RecordStore, backends: &Backends, resource: &Resource) {
    if resource
        .title
        .as_deref()
        .is_some_and(|title| !title.trim().is_empty())
    {
        debug!(resource_id = %resource.id, "resource already has a title");
        return;
    }

    let Some(source) = source_for(resource.resource_type) else {
        return;
    };

    match source {
        TitleSource::TextDerived => from_summary(store, backends, resource).await,
        TitleSource::VideoMetadata => from_metadata(store, backends, resource).await,
    }
}

async fn from_summary(store: &dyn RecordStore, backends: &Backends, resource: &Resource) {
    let notes = match resource
        .summary_notes
        .as_deref()
        .filter(|notes| !notes.trim().is_empty())
    {
        Some(notes) => notes,
        None => {
            warn!(resource_id = %resource.id, "no summary notes, cannot derive a title");
            return;
        }
    };

    let sample = title_sample(notes);
    info!(resource_id = %resource.id, "generating title");
    let raw = match backends.generator.generate(TITLE_PROMPT, &sample).await {
        Ok(raw) => raw,
        Err(e) => {
            error!(resource_id = %resource.id, error = %e, "title generation failed");
            return;
        }
    };

    let title = clean_title(&raw);
    if title.is_empty() {
        error!(resource_id = %resource.id, "generator returned an empty title");
        return;
    }

    if let Err(e) = store.set_title(resource.id, resource.owner_id, &title) {
        error!(resource_id = %resource.id, error = %e, "failed to persist title");
        return;
    }

    info!(resource_id = %resource.id, title, "title saved");
}

async fn from_metadata(store: &dyn RecordStore, backends: &Backends, resource: &Resource) {
    let url = match resource.source_locator.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => url,
        None => {
            warn!(resource_id = %resource.id, "no video URL, cannot fetch a title");
            return;
        }
    };

    info!(resource_id = %resource.id, "fetching platform title");
    let raw = match backends.metadata.title_of(url).await {
        Ok(title) => title,
        Err(e) => {
            error!(resource_id = %resource.id, error = %e, "platform title lookup failed");
            return;
        }
    };

    let title = truncate_chars(raw.trim(), TITLE_MAX_CHARS);
    if title.is_empty() {
        warn!(resource_id = %resource.id, "platform returned an empty title");
        return;
    }

    if let Err(e) = store.set_title(resource.id, resource.owner_id, &title) {
        error!(resource_id = %resource.id, error = %e, "failed to persist title");
        return;
    }

    info!(resource_id = %resource.id, title, "title saved");
}

/// The opening slice of the summary notes shown to the generator.
///
/// Takes the first 1500 characters; when that cuts mid-thought, trims back
/// to the last sentence boundary, but only if the boundary leaves enough
/// material to name the document from.
fn title_sample(notes: &str) -> String {
    let chars: Vec<char> = notes.chars().collect();
    if chars.len() <= SAMPLE_CHARS {
        return notes.trim().to_string();
    }

    let window = &chars[..SAMPLE_CHARS];
    let boundary = window
        .iter()
        .rposition(|c| matches!(c, '.' | '!' | '?'));

    let cut = match boundary {
        Some(idx) if idx > MIN_BOUNDARY_CHARS => idx + 1,
        _ => SAMPLE_CHARS,
    };

    window[..cut].iter().collect::<String>().trim().to_string()
}

/// Strip wrapping quotes the generator tends to add and cap the length.
fn clean_title(raw: &str) -> String {
    let stripped = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    truncate_chars(stripped, TITLE_MAX_CHARS)
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect::<String>().trim_end().to_string()
}
