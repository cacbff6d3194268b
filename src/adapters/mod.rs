//! Adapter interfaces for external systems.
//!
//! Every third-party capability the pipeline depends on lives behind a
//! trait here: blob storage, speech-to-text, OCR, page rendering, caption
//! fetch, video metadata, and text generation. The pipeline only sees the
//! traits; tests substitute fakes.

pub mod blob;
pub mod captions;
pub mod generation;
pub mod metadata;
pub mod ocr;
pub mod pdf;
pub mod speech;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::ResolvedConfig;

pub use blob::{parse_locator, BlobError, BlobLocation, BlobStore, S3HttpStore};
pub use captions::{CaptionError, CaptionSegment, CaptionSource, TimedTextClient};
pub use generation::{ChatClient, TextGenerator};
pub use metadata::{OEmbedClient, VideoMetadataSource};
pub use ocr::{OcrEngine, OcrError, TesseractCli};
pub use pdf::{PageRenderer, PopplerCli, RenderError};
pub use speech::{SpeechToText, WhisperCli};

/// The full set of backend handles the pipeline runs against.
///
/// Cloning is cheap; each ingestion task can carry its own copy.
#[derive(Clone)]
pub struct Backends {
    pub blob: Arc<dyn BlobStore>,
    pub speech: Arc<dyn SpeechToText>,
    pub ocr: Arc<dyn OcrEngine>,
    pub renderer: Arc<dyn PageRenderer>,
    pub captions: Arc<dyn CaptionSource>,
    pub metadata: Arc<dyn VideoMetadataSource>,
    pub generator: Arc<dyn TextGenerator>,
}

impl Backends {
    /// Wire up the production backends from resolved configuration.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("Generation API key not configured (set LECTERN_API_KEY)")?;

        Ok(Self {
            blob: Arc::new(S3HttpStore::new(&config.region)),
            speech: Arc::new(WhisperCli::new(&config.whisper_path, &config.whisper_model)),
            ocr: Arc::new(TesseractCli::new(&config.tesseract_path)),
            renderer: Arc::new(PopplerCli::new(&config.pdftoppm_path)),
            captions: Arc::new(TimedTextClient::new(config.captions_proxy.as_ref())?),
            metadata: Arc::new(OEmbedClient::new()),
            generator: Arc::new(ChatClient::new(
                &config.generation_url,
                api_key,
                &config.generation_model,
            )),
        })
    }
}
