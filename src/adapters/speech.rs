//! Speech-to-text backend.
//!
//! Shells out to a local whisper binary for transcription.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

/// Turns an audio file into plain text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

/// Whisper output JSON structure
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    text: String,
}

/// Speech-to-text via the local whisper CLI.
pub struct WhisperCli {
    binary_path: String,
    model: String,
}

impl WhisperCli {
    pub fn new(binary_path: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl SpeechToText for WhisperCli {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        // Whisper writes its JSON next to other output formats, so point it
        // at a throwaway directory.
        let out_dir = tempfile::tempdir().context("Failed to create whisper output dir")?;

        let output = Command::new(&self.binary_path)
            .arg(audio_path)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_dir")
            .arg(out_dir.path())
            .arg("--output_format")
            .arg("json")
            .arg("--language")
            .arg("en")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to run whisper")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Whisper failed: {}", stderr.trim());
        }

        let stem = audio_path.file_stem().unwrap_or_default().to_string_lossy();
        let json_path = out_dir.path().join(format!("{}.json", stem));

        let json_content = tokio::fs::read_to_string(&json_path)
            .await
            .context("Failed to read whisper output")?;

        let whisper: WhisperOutput =
            serde_json::from_str(&json_content).context("Failed to parse whisper JSON")?;

        Ok(whisper.text.trim().to_string())
    }
}
