//! Caption fetch for web videos.
//!
//! Fetches time-coded caption segments from the platform's timedtext
//! endpoint, optionally through a credentialed proxy (caption endpoints
//! rate-limit data-center addresses aggressively).

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ProxyConfig;

#[derive(Debug, Error)]
pub enum CaptionError {
    /// The video exists but has no usable caption track
    #[error("no captions available: {0}")]
    Unavailable(String),

    #[error("caption fetch failed: {0}")]
    Fetch(String),
}

/// One time-coded caption segment. Offsets are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Fetches the ordered caption segments of a video.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionSegment>, CaptionError>;
}

// timedtext json3 wire format
#[derive(Debug, Deserialize)]
struct TimedTextResponse {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSeg>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

/// Caption client for the platform timedtext endpoint.
pub struct TimedTextClient {
    client: reqwest::Client,
}

impl TimedTextClient {
    pub fn new(proxy: Option<&ProxyConfig>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(proxy) = proxy {
            let mut p = reqwest::Proxy::all(&proxy.url)
                .with_context(|| format!("Invalid caption proxy url: {}", proxy.url))?;
            if let (Some(user), Some(pass)) = (&proxy.username, &proxy.password) {
                p = p.basic_auth(user, pass);
            }
            builder = builder.proxy(p);
        }

        Ok(Self {
            client: builder.build().context("Failed to build caption client")?,
        })
    }
}

#[async_trait]
impl CaptionSource for TimedTextClient {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionSegment>, CaptionError> {
        let response = self
            .client
            .get("https://www.youtube.com/api/timedtext")
            .query(&[("v", video_id), ("lang", "en"), ("fmt", "json3")])
            .send()
            .await
            .map_err(|e| CaptionError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CaptionError::Fetch(format!(
                "timedtext returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CaptionError::Fetch(e.to_string()))?;

        // An empty body means the video has no caption track at all.
        if body.trim().is_empty() {
            return Err(CaptionError::Unavailable(video_id.to_string()));
        }

        let parsed: TimedTextResponse = serde_json::from_str(&body)
            .map_err(|e| CaptionError::Fetch(format!("bad timedtext payload: {e}")))?;

        let segments: Vec<CaptionSegment> = parsed
            .events
            .into_iter()
            .filter_map(|event| {
                let text: String = event
                    .segs
                    .iter()
                    .map(|seg| seg.utf8.as_str())
                    .collect::<Vec<_>>()
                    .join("");
                let text = text.replace('\n', " ").trim().to_string();
                if text.is_empty() {
                    return None;
                }
                Some(CaptionSegment {
                    text,
                    start: event.start_ms as f64 / 1000.0,
                    duration: event.duration_ms as f64 / 1000.0,
                })
            })
            .collect();

        if segments.is_empty() {
            return Err(CaptionError::Unavailable(video_id.to_string()));
        }

        Ok(segments)
    }
}
