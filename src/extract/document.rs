//! Document extraction: render pages to images, OCR each page.
//!
//! Page-level problems stay page-level: an empty page is skipped with a
//! warning and an OCR failure on one page does not stop the next. Only a
//! missing runtime (renderer or OCR binary) degrades the whole resource.

use tracing::{info, warn};

use crate::adapters::{Backends, OcrError, RenderError};
use crate::domain::Resource;

use super::{fetch_blob, Extraction};

pub(super) async fn extract(resource: &Resource, backends: &Backends) -> Extraction {
    let locator = match resource.source_locator.as_deref().filter(|l| !l.is_empty()) {
        Some(locator) => locator,
        None => {
            return Extraction::Degraded(
                "Document processing failed: no file locator on this resource".to_string(),
            )
        }
    };

    let scratch = match tempfile::Builder::new()
        .prefix("lectern-doc-")
        .suffix(".pdf")
        .tempfile()
    {
        Ok(f) => f,
        Err(e) => {
            return Extraction::Degraded(format!(
                "Document processing failed: could not create scratch file: {e}"
            ))
        }
    };

    info!(locator, "downloading document upload");
    if let Err(e) = fetch_blob(backends.blob.as_ref(), locator, scratch.path()).await {
        warn!(error = %e, "document download failed");
        return Extraction::Degraded(format!("Document processing failed: {e}"));
    }

    let pages_dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            return Extraction::Degraded(format!(
                "Document processing failed: could not create page directory: {e}"
            ))
        }
    };

    info!("rendering document pages");
    let pages = match backends.renderer.render(scratch.path(), pages_dir.path()).await {
        Ok(pages) => pages,
        Err(RenderError::Unavailable(e)) => {
            warn!(error = %e, "page renderer missing");
            return Extraction::Degraded(format!(
                "Document processing unavailable: page rendering backend is not installed ({e})"
            ));
        }
        Err(RenderError::Failed(e)) => {
            warn!(error = %e, "page rendering failed");
            return Extraction::Degraded(format!("Document processing failed: {e}"));
        }
    };

    info!(pages = pages.len(), "running OCR per page");
    let mut sections: Vec<String> = Vec::new();
    for (i, page) in pages.iter().enumerate() {
        let page_number = i + 1;
        match backends.ocr.recognize(page).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    warn!(page = page_number, "no text found on page");
                } else {
                    sections.push(format!("--- Page {page_number} ---\n{text}"));
                }
            }
            Err(OcrError::Unavailable(e)) => {
                warn!(error = %e, "OCR backend missing");
                return Extraction::Degraded(format!(
                    "Document processing unavailable: OCR backend is not installed ({e})"
                ));
            }
            Err(OcrError::Failed(e)) => {
                warn!(page = page_number, error = %e, "OCR failed on page, continuing");
            }
        }
    }

    if sections.is_empty() {
        return Extraction::Degraded(
            "No text could be extracted from this document. It may contain only images \
             or be password protected."
                .to_string(),
        );
    }

    info!(pages = sections.len(), "document transcription complete");
    Extraction::Complete(sections.join("\n\n"))
}
