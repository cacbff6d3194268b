//! Shared test doubles for the backend traits.
//!
//! Each fake starts out "working" with canned output and can be flipped
//! into a failure mode by a test. Call counters let tests assert that
//! idempotent paths skip the backend entirely.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use lectern::adapters::{
    parse_locator, Backends, BlobError, BlobStore, CaptionError, CaptionSegment, CaptionSource,
    OcrEngine, OcrError, PageRenderer, RenderError, SpeechToText, TextGenerator,
    VideoMetadataSource,
};

/// Blob store backed by an in-memory map of locator -> bytes.
#[derive(Default)]
pub struct FakeBlob {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeBlob {
    pub fn put(&self, locator: &str, bytes: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(locator.to_string(), bytes.to_vec());
    }
}

#[async_trait]
impl BlobStore for FakeBlob {
    async fn download(&self, locator: &str, dest: &Path) -> Result<(), BlobError> {
        parse_locator(locator)?;
        let bytes = self
            .objects
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(locator.to_string()))?;
        std::fs::write(dest, bytes).map_err(|e| BlobError::Transfer(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, locator: &str) -> Result<(), BlobError> {
        self.objects.lock().unwrap().remove(locator);
        Ok(())
    }
}

pub struct FakeSpeech {
    pub text: Mutex<Option<String>>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl SpeechToText for FakeSpeech {
    async fn transcribe(&self, _audio_path: &Path) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.text.lock().unwrap().clone() {
            Some(text) => Ok(text),
            None => anyhow::bail!("speech backend offline"),
        }
    }
}

pub struct FakeOcr {
    pub text: Mutex<Option<String>>,
    pub unavailable: Mutex<bool>,
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn recognize(&self, _image_path: &Path) -> Result<String, OcrError> {
        if *self.unavailable.lock().unwrap() {
            return Err(OcrError::Unavailable("tesseract not found".into()));
        }
        match self.text.lock().unwrap().clone() {
            Some(text) => Ok(text),
            None => Err(OcrError::Failed("unreadable image".into())),
        }
    }
}

pub struct FakeRenderer {
    pub page_count: Mutex<usize>,
    pub unavailable: Mutex<bool>,
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render(
        &self,
        _document_path: &Path,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, RenderError> {
        if *self.unavailable.lock().unwrap() {
            return Err(RenderError::Unavailable("pdftoppm not found".into()));
        }
        let mut pages = Vec::new();
        for i in 1..=*self.page_count.lock().unwrap() {
            let page = out_dir.join(format!("page-{i:02}.jpg"));
            std::fs::write(&page, b"jpeg").map_err(|e| RenderError::Failed(e.to_string()))?;
            pages.push(page);
        }
        Ok(pages)
    }
}

pub struct FakeCaptions {
    pub segments: Mutex<Option<Vec<CaptionSegment>>>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl CaptionSource for FakeCaptions {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionSegment>, CaptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.segments.lock().unwrap().clone() {
            Some(segments) => Ok(segments),
            None => Err(CaptionError::Unavailable(video_id.to_string())),
        }
    }
}

pub struct FakeMetadata {
    pub title: Mutex<Option<String>>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl VideoMetadataSource for FakeMetadata {
    async fn title_of(&self, _url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.title.lock().unwrap().clone() {
            Some(title) => Ok(title),
            None => anyhow::bail!("metadata backend offline"),
        }
    }
}

pub struct FakeGenerator {
    /// Response for free-text calls (titles, flash cards, quizzes)
    pub text_response: Mutex<Option<String>>,
    /// Response for structured calls (summaries)
    pub json_response: Mutex<Option<String>>,
    pub text_calls: AtomicUsize,
    pub json_calls: AtomicUsize,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, _system: &str, _user: &str) -> Result<String> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        match self.text_response.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => anyhow::bail!("generation backend offline"),
        }
    }

    async fn generate_json(
        &self,
        _system: &str,
        _user: &str,
        _schema_name: &str,
        _schema: serde_json::Value,
    ) -> Result<String> {
        self.json_calls.fetch_add(1, Ordering::SeqCst);
        match self.json_response.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => anyhow::bail!("generation backend offline"),
        }
    }
}

/// The full fake backend set, everything in a working state.
pub struct Fakes {
    pub blob: Arc<FakeBlob>,
    pub speech: Arc<FakeSpeech>,
    pub ocr: Arc<FakeOcr>,
    pub renderer: Arc<FakeRenderer>,
    pub captions: Arc<FakeCaptions>,
    pub metadata: Arc<FakeMetadata>,
    pub generator: Arc<FakeGenerator>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self::new()
    }
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            blob: Arc::new(FakeBlob::default()),
            speech: Arc::new(FakeSpeech {
                text: Mutex::new(Some("spoken words from the lecture".into())),
                calls: AtomicUsize::new(0),
            }),
            ocr: Arc::new(FakeOcr {
                text: Mutex::new(Some("printed words on the page".into())),
                unavailable: Mutex::new(false),
            }),
            renderer: Arc::new(FakeRenderer {
                page_count: Mutex::new(2),
                unavailable: Mutex::new(false),
            }),
            captions: Arc::new(FakeCaptions {
                segments: Mutex::new(Some(vec![
                    CaptionSegment {
                        text: "hello world".into(),
                        start: 0.0,
                        duration: 1.0,
                    },
                    CaptionSegment {
                        text: "Next thought".into(),
                        start: 5.0,
                        duration: 1.0,
                    },
                ])),
                calls: AtomicUsize::new(0),
            }),
            metadata: Arc::new(FakeMetadata {
                title: Mutex::new(Some("Platform Video Title".into())),
                calls: AtomicUsize::new(0),
            }),
            generator: Arc::new(FakeGenerator {
                text_response: Mutex::new(Some("Generated Title".into())),
                json_response: Mutex::new(Some(
                    r#"{"summary": "Condensed study notes.", "emoji": "📘"}"#.into(),
                )),
                text_calls: AtomicUsize::new(0),
                json_calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn backends(&self) -> Backends {
        Backends {
            blob: self.blob.clone(),
            speech: self.speech.clone(),
            ocr: self.ocr.clone(),
            renderer: self.renderer.clone(),
            captions: self.captions.clone(),
            metadata: self.metadata.clone(),
            generator: self.generator.clone(),
        }
    }
}
