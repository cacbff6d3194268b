//! Image-set extraction: download and OCR each uploaded image.
//!
//! Each image is processed independently; one bad image leaves an inline
//! error marker in its block and the rest continue. Only a missing OCR
//! runtime aborts the whole stage.

use tracing::{info, warn};

use crate::adapters::{parse_locator, Backends, OcrError};
use crate::domain::{Resource, ResourceImage};
use crate::store::RecordStore;

use super::{fetch_blob, Extraction};

/// Why a single image could not be processed.
enum ImageFailure {
    /// OCR runtime missing: aborts the whole stage
    OcrUnavailable(String),

    /// Anything else: recorded inline, processing continues
    Other(String),
}

pub(super) async fn extract(
    resource: &Resource,
    store: &dyn RecordStore,
    backends: &Backends,
) -> Extraction {
    let images = match store.images(resource.id, resource.owner_id) {
        Ok(images) => images,
        Err(e) => {
            warn!(error = %e, "could not enumerate resource images");
            return Extraction::Degraded(format!("Image processing failed: {e}"));
        }
    };

    if images.is_empty() {
        return Extraction::Degraded(
            "Image processing failed: no images have been uploaded for this resource".to_string(),
        );
    }

    info!(count = images.len(), "running OCR over image set");
    let mut blocks: Vec<String> = Vec::new();
    let mut extracted_any = false;

    for (i, image) in images.iter().enumerate() {
        let image_number = i + 1;
        match ocr_image(image, backends).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    warn!(image = image_number, "no text found in image");
                } else {
                    blocks.push(format!("--- Image {image_number} ---\n{text}"));
                    extracted_any = true;
                }
            }
            Err(ImageFailure::OcrUnavailable(e)) => {
                warn!(error = %e, "OCR backend missing");
                return Extraction::Degraded(format!(
                    "Image processing unavailable: OCR backend is not installed ({e})"
                ));
            }
            Err(ImageFailure::Other(e)) => {
                warn!(image = image_number, error = %e, "image failed, continuing");
                blocks.push(format!(
                    "--- Image {image_number} ---\n[Error processing this image: {e}]"
                ));
            }
        }
    }

    if !extracted_any {
        return Extraction::Degraded(
            "No text could be extracted from the uploaded images.".to_string(),
        );
    }

    Extraction::Complete(blocks.join("\n\n"))
}

async fn ocr_image(image: &ResourceImage, backends: &Backends) -> Result<String, ImageFailure> {
    let location = parse_locator(&image.image_locator)
        .map_err(|e| ImageFailure::Other(e.to_string()))?;
    let extension = location.extension().unwrap_or_else(|| ".jpg".to_string());

    let scratch = tempfile::Builder::new()
        .prefix("lectern-image-")
        .suffix(&extension)
        .tempfile()
        .map_err(|e| ImageFailure::Other(format!("could not create scratch file: {e}")))?;

    fetch_blob(backends.blob.as_ref(), &image.image_locator, scratch.path())
        .await
        .map_err(|e| ImageFailure::Other(e.to_string()))?;

    backends
        .ocr
        .recognize(scratch.path())
        .await
        .map_err(|e| match e {
            OcrError::Unavailable(msg) => ImageFailure::OcrUnavailable(msg),
            OcrError::Failed(msg) => ImageFailure::Other(msg),
        })
}
