//! Audio extraction: blob download + speech-to-text.
//!
//! The upload is pulled into a scratch file that keeps the original
//! extension (the speech backend sniffs format from it). The
//! `NamedTempFile` owns the scratch file, so it is removed on every exit
//! path, including errors.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::{parse_locator, Backends};
use crate::domain::Resource;

use super::{fetch_blob, Extraction};

pub(super) async fn extract(resource: &Resource, backends: &Backends) -> Extraction {
    match transcribe(resource, backends).await {
        Ok(text) => Extraction::Complete(text),
        Err(e) => {
            warn!(error = %e, "audio transcription degraded");
            Extraction::Degraded(format!("Transcription failed: {e:#}"))
        }
    }
}

async fn transcribe(resource: &Resource, backends: &Backends) -> Result<String> {
    let locator = resource
        .source_locator
        .as_deref()
        .filter(|l| !l.is_empty())
        .context("no audio file locator on this resource")?;

    let location = parse_locator(locator)?;
    let extension = location.extension().unwrap_or_else(|| ".wav".to_string());

    let scratch = tempfile::Builder::new()
        .prefix("lectern-audio-")
        .suffix(&extension)
        .tempfile()
        .context("failed to create scratch file")?;

    info!(locator, "downloading audio upload");
    fetch_blob(backends.blob.as_ref(), locator, scratch.path()).await?;

    info!("submitting audio to speech-to-text");
    let text = backends.speech.transcribe(scratch.path()).await?;

    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("speech-to-text returned empty text");
    }

    info!(chars = text.len(), "audio transcription complete");
    Ok(text.to_string())
}
