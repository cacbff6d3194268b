//! OCR backend.
//!
//! Shells out to the tesseract CLI, recognition language fixed to English.
//! A missing binary is reported as `OcrError::Unavailable` so extraction
//! can degrade the whole resource instead of failing page by page.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum OcrError {
    /// The OCR runtime is not installed on this host
    #[error("OCR backend unavailable: {0}")]
    Unavailable(String),

    #[error("OCR failed: {0}")]
    Failed(String),
}

/// Turns a single image into plain text.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image_path: &Path) -> Result<String, OcrError>;
}

/// OCR via the tesseract CLI.
pub struct TesseractCli {
    binary_path: String,
}

impl TesseractCli {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, image_path: &Path) -> Result<String, OcrError> {
        // "stdout" as the output base makes tesseract print the text
        // instead of writing a file.
        let output = Command::new(&self.binary_path)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg("eng")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    OcrError::Unavailable(format!("{} not found", self.binary_path))
                } else {
                    OcrError::Failed(format!("failed to run {}: {e}", self.binary_path))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Failed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
