//! Document page rendering.
//!
//! Shells out to poppler's pdftoppm to render every page of a document to
//! an image at 200 DPI. Like the OCR backend, a missing binary is a
//! distinct error so extraction can degrade the whole resource.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

const RENDER_DPI: u32 = 200;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The rendering runtime is not installed on this host
    #[error("page renderer unavailable: {0}")]
    Unavailable(String),

    #[error("page rendering failed: {0}")]
    Failed(String),
}

/// Renders every page of a document to an ordered list of image files.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, document_path: &Path, out_dir: &Path)
        -> Result<Vec<PathBuf>, RenderError>;
}

/// Page rendering via poppler's pdftoppm.
pub struct PopplerCli {
    binary_path: String,
}

impl PopplerCli {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

#[async_trait]
impl PageRenderer for PopplerCli {
    async fn render(
        &self,
        document_path: &Path,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, RenderError> {
        let output = Command::new(&self.binary_path)
            .arg("-jpeg")
            .arg("-r")
            .arg(RENDER_DPI.to_string())
            .arg(document_path)
            .arg(out_dir.join("page"))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    RenderError::Unavailable(format!("{} not found", self.binary_path))
                } else {
                    RenderError::Failed(format!("failed to run {}: {e}", self.binary_path))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Failed(stderr.trim().to_string()));
        }

        // pdftoppm zero-pads page numbers (page-01.jpg, page-02.jpg, ...),
        // so a lexical sort restores page order.
        let mut pages = Vec::new();
        let mut entries = tokio::fs::read_dir(out_dir)
            .await
            .map_err(|e| RenderError::Failed(format!("listing rendered pages: {e}")))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RenderError::Failed(format!("listing rendered pages: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("jpg") {
                pages.push(path);
            }
        }
        pages.sort();

        Ok(pages)
    }
}
