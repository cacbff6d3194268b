//! Per-type content extraction.
//!
//! Each resource type with out-of-band content has one extractor variant
//! that turns the raw source into transcript text. Extraction never fails
//! past its own boundary: every failure mode becomes a human-readable
//! placeholder carried as data, and the pipeline keeps going. Partial
//! knowledge ("video has no captions") is more useful downstream than a
//! hard failure.

mod audio;
mod document;
mod images;
pub mod webvideo;

use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::adapters::{Backends, BlobError, BlobStore};
use crate::domain::{Resource, ResourceType};
use crate::store::RecordStore;

pub use webvideo::{parse_video_id, reflow_segments, UnparseableUrl};

/// Outcome of an extraction stage.
///
/// Degraded extraction still produces transcript text (a diagnostic
/// message the user can read), so the orchestrator commits either variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Real content extracted from the source
    Complete(String),

    /// Extraction could not produce content; the text explains why
    Degraded(String),
}

impl Extraction {
    pub fn text(&self) -> &str {
        match self {
            Self::Complete(text) | Self::Degraded(text) => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// The closed set of extraction variants, keyed by resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    WebVideo,
    Document,
    Audio,
    ImageSet,
}

impl Extractor {
    /// Extractor for a resource type, if the type has out-of-band content.
    /// Plain text has none: its content is resident from creation.
    pub fn for_type(resource_type: ResourceType) -> Option<Self> {
        match resource_type {
            ResourceType::WebVideoLink => Some(Self::WebVideo),
            ResourceType::Document => Some(Self::Document),
            ResourceType::Audio => Some(Self::Audio),
            ResourceType::ImageSet => Some(Self::ImageSet),
            ResourceType::PlainText => None,
        }
    }

    /// Run the extraction. The store handle is passed through for variants
    /// that need side-reads (the image set enumerates its uploads).
    pub async fn extract(
        &self,
        resource: &Resource,
        store: &dyn RecordStore,
        backends: &Backends,
    ) -> Extraction {
        match self {
            Self::WebVideo => webvideo::extract(resource, backends).await,
            Self::Document => document::extract(resource, backends).await,
            Self::Audio => audio::extract(resource, backends).await,
            Self::ImageSet => images::extract(resource, store, backends).await,
        }
    }
}

/// Bounded retry against blob-store "not found".
///
/// Freshly-uploaded objects can lag behind the record pointing at them, so
/// a missing object is retried a few times before counting as fatal for
/// the stage. Applies uniformly to every blob-backed extractor.
const DOWNLOAD_ATTEMPTS: u32 = 6;
const DOWNLOAD_RETRY_DELAY: Duration = Duration::from_secs(2);

pub(crate) async fn fetch_blob(
    blob: &dyn BlobStore,
    locator: &str,
    dest: &Path,
) -> Result<(), BlobError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match blob.download(locator, dest).await {
            Ok(()) => return Ok(()),
            Err(BlobError::NotFound(_)) if attempt < DOWNLOAD_ATTEMPTS => {
                warn!(locator, attempt, "blob not found yet, retrying");
                tokio::time::sleep(DOWNLOAD_RETRY_DELAY).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_has_no_extractor() {
        assert_eq!(Extractor::for_type(ResourceType::PlainText), None);
    }

    #[test]
    fn every_other_type_dispatches() {
        assert_eq!(
            Extractor::for_type(ResourceType::WebVideoLink),
            Some(Extractor::WebVideo)
        );
        assert_eq!(
            Extractor::for_type(ResourceType::Document),
            Some(Extractor::Document)
        );
        assert_eq!(Extractor::for_type(ResourceType::Audio), Some(Extractor::Audio));
        assert_eq!(
            Extractor::for_type(ResourceType::ImageSet),
            Some(Extractor::ImageSet)
        );
    }

    #[test]
    fn degraded_extraction_still_carries_text() {
        let extraction = Extraction::Degraded("Transcript not available: no captions".into());
        assert!(extraction.is_degraded());
        assert!(extraction.text().starts_with("Transcript not available"));
    }
}
