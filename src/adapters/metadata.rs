//! Video metadata lookup.
//!
//! The platform's oEmbed endpoint returns title and author for a video URL
//! without touching the media itself.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// Fetches display metadata for a video URL without downloading content.
#[async_trait]
pub trait VideoMetadataSource: Send + Sync {
    async fn title_of(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: String,
}

/// Metadata client for the platform oEmbed endpoint.
pub struct OEmbedClient {
    client: reqwest::Client,
}

impl Default for OEmbedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OEmbedClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl VideoMetadataSource for OEmbedClient {
    async fn title_of(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get("https://www.youtube.com/oembed")
            .query(&[("url", url), ("format", "json")])
            .send()
            .await
            .context("oEmbed request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("oEmbed returned {}", response.status());
        }

        let metadata: OEmbedResponse = response
            .json()
            .await
            .context("Failed to parse oEmbed response")?;

        if metadata.title.trim().is_empty() {
            anyhow::bail!("oEmbed returned an empty title");
        }

        Ok(metadata.title)
    }
}
