//! Record store for resources, folders, and derived artifacts.
//!
//! The store is the pipeline's only persistence boundary. It is modeled as
//! a trait so the orchestrator and generators never see the storage engine;
//! the production implementation is SQLite (`SqliteStore`). Every operation
//! is scoped by owner id: an id that exists but belongs to another user is
//! indistinguishable from one that does not exist.

mod sqlite;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    FlashCard, Folder, NewFlashCard, NewQuizQuestion, NewResource, QuizQuestion, Resource,
    ResourceImage, ResourceStatus,
};

pub use sqlite::SqliteStore;

/// Errors from record-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matches the given id/owner pair
    #[error("record not found")]
    NotFound,

    /// A stored column failed to parse back into its domain type
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Contents of one folder: subfolders first, both newest first.
#[derive(Debug, Clone, Default)]
pub struct FolderContents {
    pub folders: Vec<Folder>,
    pub resources: Vec<Resource>,
}

/// Blob locators released by a cascade delete.
///
/// The store cannot reach the blob backend, so it hands the locators back
/// for the caller to delete best-effort.
#[derive(Debug, Clone, Default)]
pub struct ReleasedBlobs {
    pub locators: Vec<String>,
}

/// Persistence operations needed by the ingestion pipeline and the
/// derived-artifact generators.
pub trait RecordStore: Send + Sync {
    /// Create a resource in the `processing` state. Inline content (plain
    /// text) is written to the transcript immediately.
    fn create_resource(&self, new: NewResource) -> Result<Resource, StoreError>;

    /// Point lookup by id, scoped to the owner. Does NOT load the
    /// transcript column.
    fn resource(&self, id: Uuid, owner: Uuid) -> Result<Resource, StoreError>;

    fn set_status(&self, id: Uuid, owner: Uuid, status: ResourceStatus) -> Result<(), StoreError>;

    /// Load the transcript on demand. None when never written.
    fn transcript(&self, id: Uuid, owner: Uuid) -> Result<Option<String>, StoreError>;

    fn set_transcript(&self, id: Uuid, owner: Uuid, transcript: &str) -> Result<(), StoreError>;

    /// Write summary notes; the glyph is only overwritten when one was
    /// actually produced.
    fn set_summary(
        &self,
        id: Uuid,
        owner: Uuid,
        notes: &str,
        glyph: Option<&str>,
    ) -> Result<(), StoreError>;

    fn set_title(&self, id: Uuid, owner: Uuid, title: &str) -> Result<(), StoreError>;

    fn add_image(&self, id: Uuid, owner: Uuid, locator: &str) -> Result<ResourceImage, StoreError>;

    /// Images of an image-set resource, ordered by upload time.
    fn images(&self, id: Uuid, owner: Uuid) -> Result<Vec<ResourceImage>, StoreError>;

    /// Insert a batch of flash cards in one transaction: all rows commit
    /// together or none do.
    fn insert_flash_cards(
        &self,
        id: Uuid,
        owner: Uuid,
        cards: &[NewFlashCard],
    ) -> Result<usize, StoreError>;

    /// Insert a batch of quiz questions in one transaction.
    fn insert_quiz_questions(
        &self,
        id: Uuid,
        owner: Uuid,
        questions: &[NewQuizQuestion],
    ) -> Result<usize, StoreError>;

    fn flash_cards(&self, id: Uuid, owner: Uuid) -> Result<Vec<FlashCard>, StoreError>;

    fn quiz_questions(&self, id: Uuid, owner: Uuid) -> Result<Vec<QuizQuestion>, StoreError>;

    fn create_folder(
        &self,
        owner: Uuid,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<Folder, StoreError>;

    /// List one folder level. `parent_id: None` lists the root level.
    fn folder_contents(&self, owner: Uuid, parent_id: Option<i64>)
        -> Result<FolderContents, StoreError>;

    /// Delete a resource and everything derived from it (cards, questions,
    /// images). Returns the blob locators the caller should release.
    fn delete_resource(&self, id: Uuid, owner: Uuid) -> Result<ReleasedBlobs, StoreError>;

    /// Recursively delete a folder, its subfolders, and every contained
    /// resource with its artifacts.
    fn delete_folder(&self, owner: Uuid, folder_id: i64) -> Result<ReleasedBlobs, StoreError>;
}
