//! Resource and folder types.
//!
//! A Resource is the central entity: one piece of user-supplied source
//! material and the text artifacts derived from it. The transcript is
//! deliberately NOT part of this struct; it can be very large and is only
//! reachable through the record store's point operations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of source material a resource was created from.
///
/// Fixed at creation; drives extractor and title-generator dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A link to a video on a captioned video platform
    WebVideoLink,

    /// An uploaded document (PDF), processed page by page with OCR
    Document,

    /// An uploaded audio recording, processed with speech-to-text
    Audio,

    /// Raw text supplied inline at creation
    PlainText,

    /// An ordered set of uploaded images, each processed with OCR
    ImageSet,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebVideoLink => "web_video_link",
            Self::Document => "document",
            Self::Audio => "audio",
            Self::PlainText => "plain_text",
            Self::ImageSet => "image_set",
        }
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web_video_link" => Ok(Self::WebVideoLink),
            "document" => Ok(Self::Document),
            "audio" => Ok(Self::Audio),
            "plain_text" => Ok(Self::PlainText),
            "image_set" => Ok(Self::ImageSet),
            other => Err(format!("unknown resource type: {other}")),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing state of a resource.
///
/// The wire strings are stable; callers match on them. Status only advances
/// forward through the pipeline order or jumps to `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Processing,
    Extracting,
    Summarizing,
    Completed,
    Failed,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Extracting => "extracting",
            Self::Summarizing => "summarizing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// True once the pipeline can no longer advance this resource.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl FromStr for ResourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "extracting" => Ok(Self::Extracting),
            "summarizing" => Ok(Self::Summarizing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown resource status: {other}")),
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A learning resource and its derived text fields.
///
/// The transcript is excluded: load it with `RecordStore::transcript` when
/// actually needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,

    /// Owning user; every read/write path is scoped to it
    pub owner_id: Uuid,

    pub resource_type: ResourceType,

    /// URL or blob reference to the original content. None for plain-text
    /// resources, whose content is written to the transcript at creation.
    pub source_locator: Option<String>,

    pub title: Option<String>,

    /// Condensed markdown study notes, set by the summarizer
    pub summary_notes: Option<String>,

    /// Single representative emoji, set by the summarizer
    pub glyph: Option<String>,

    pub folder_id: Option<i64>,

    pub status: ResourceStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a resource.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub owner_id: Uuid,
    pub resource_type: ResourceType,
    pub source_locator: Option<String>,
    pub title: Option<String>,
    pub folder_id: Option<i64>,

    /// Inline content for plain-text resources; written straight to the
    /// transcript at creation (no extraction stage runs for this type).
    pub inline_content: Option<String>,
}

impl NewResource {
    pub fn new(owner_id: Uuid, resource_type: ResourceType) -> Self {
        Self {
            owner_id,
            resource_type,
            source_locator: None,
            title: None,
            folder_id: None,
            inline_content: None,
        }
    }

    pub fn with_source(mut self, locator: impl Into<String>) -> Self {
        self.source_locator = Some(locator.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_folder(mut self, folder_id: i64) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.inline_content = Some(content.into());
        self
    }
}

/// A per-user folder in the resource tree (parent-pointer model).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub owner_id: Uuid,
    pub name: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
