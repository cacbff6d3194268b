//! Blob store access for uploaded source files.
//!
//! Uploads live in an S3-style bucket. Two locator shapes are accepted and
//! must resolve to the same (bucket, key) pair:
//!
//! - `s3://bucket-name/path/to/key`
//! - `https://bucket-name.s3.region.amazonaws.com/path/to/key`

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from blob operations.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob locator: {0}")]
    InvalidLocator(String),

    /// The object does not (yet) exist; distinguishable so callers can
    /// retry freshly-uploaded objects.
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob transfer failed: {0}")]
    Transfer(String),
}

/// A resolved bucket/key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLocation {
    pub bucket: String,
    pub key: String,
}

impl BlobLocation {
    /// File extension of the key (with leading dot), if it has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.key)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
    }
}

/// Parse a blob locator into its bucket and key.
pub fn parse_locator(locator: &str) -> Result<BlobLocation, BlobError> {
    if let Some(rest) = locator.strip_prefix("s3://") {
        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| BlobError::InvalidLocator(locator.to_string()))?;
        if bucket.is_empty() || key.is_empty() {
            return Err(BlobError::InvalidLocator(locator.to_string()));
        }
        return Ok(BlobLocation {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
    }

    if let Some(rest) = locator.strip_prefix("https://") {
        // Virtual-hosted form: bucket.s3.<region>.amazonaws.com/key
        let (host, key) = rest
            .split_once('/')
            .ok_or_else(|| BlobError::InvalidLocator(locator.to_string()))?;
        let bucket = host
            .split_once(".s3.")
            .filter(|(bucket, tail)| !bucket.is_empty() && tail.ends_with(".amazonaws.com"))
            .map(|(bucket, _)| bucket)
            .ok_or_else(|| BlobError::InvalidLocator(locator.to_string()))?;
        if key.is_empty() {
            return Err(BlobError::InvalidLocator(locator.to_string()));
        }
        return Ok(BlobLocation {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
    }

    Err(BlobError::InvalidLocator(locator.to_string()))
}

/// Download-by-locator access to the blob store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Download the object behind `locator` into `dest`.
    async fn download(&self, locator: &str, dest: &Path) -> Result<(), BlobError>;

    /// Best-effort delete; used when resources are removed.
    async fn delete(&self, locator: &str) -> Result<(), BlobError>;
}

/// HTTPS client for an S3-compatible bucket.
pub struct S3HttpStore {
    client: reqwest::Client,
    region: String,
}

impl S3HttpStore {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            region: region.into(),
        }
    }

    fn object_url(&self, location: &BlobLocation) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            location.bucket, self.region, location.key
        )
    }
}

#[async_trait]
impl BlobStore for S3HttpStore {
    async fn download(&self, locator: &str, dest: &Path) -> Result<(), BlobError> {
        let location = parse_locator(locator)?;
        let url = self.object_url(&location);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BlobError::Transfer(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BlobError::NotFound(locator.to_string()));
        }
        if !response.status().is_success() {
            return Err(BlobError::Transfer(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BlobError::Transfer(e.to_string()))?;
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| BlobError::Transfer(format!("writing {}: {e}", dest.display())))?;

        Ok(())
    }

    async fn delete(&self, locator: &str) -> Result<(), BlobError> {
        let location = parse_locator(locator)?;
        let url = self.object_url(&location);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| BlobError::Transfer(e.to_string()))?;

        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(BlobError::Transfer(format!(
                "DELETE {} returned {}",
                url,
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_locator_shapes_resolve_to_the_same_pair() {
        let from_scheme = parse_locator("s3://course-files/audio/lecture-01.mp3").unwrap();
        let from_https =
            parse_locator("https://course-files.s3.us-east-1.amazonaws.com/audio/lecture-01.mp3")
                .unwrap();

        assert_eq!(from_scheme, from_https);
        assert_eq!(from_scheme.bucket, "course-files");
        assert_eq!(from_scheme.key, "audio/lecture-01.mp3");
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert!(matches!(
            parse_locator("ftp://bucket/key"),
            Err(BlobError::InvalidLocator(_))
        ));
        assert!(matches!(
            parse_locator("s3://bucket-only"),
            Err(BlobError::InvalidLocator(_))
        ));
        assert!(matches!(
            parse_locator("https://example.com/not-a-bucket"),
            Err(BlobError::InvalidLocator(_))
        ));
        assert!(matches!(
            parse_locator("https://bucket.s3.us-east-1.evil.example/key"),
            Err(BlobError::InvalidLocator(_))
        ));
    }

    #[test]
    fn extension_comes_from_the_key() {
        let location = parse_locator("s3://b/notes/recording.m4a").unwrap();
        assert_eq!(location.extension().as_deref(), Some(".m4a"));

        let location = parse_locator("s3://b/notes/no-extension").unwrap();
        assert_eq!(location.extension(), None);
    }
}
