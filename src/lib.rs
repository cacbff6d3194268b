//! lectern - study-resource ingestion engine
//!
//! Turns uploaded or linked source material (web video, PDF document,
//! audio, raw text, image set) into study artifacts: a transcript, summary
//! notes, a title, flash cards, and quiz questions.
//!
//! # Architecture
//!
//! Ingestion is a bounded, fixed sequence of stages run once per resource:
//! extract (type-dispatched) → summarize → title → complete. Extraction
//! degrades to a diagnostic transcript instead of failing, so a resource
//! almost always reaches `completed`; `failed` is reserved for structural
//! problems.
//!
//! # Modules
//!
//! - `adapters`: external backends behind traits (blob store, speech,
//!   OCR, page rendering, captions, metadata, generation)
//! - `store`: record store (SQLite) for resources, folders, artifacts
//! - `extract`: per-type content extraction
//! - `ingest`: the pipeline state machine plus summary/title stages
//! - `generate`: flash-card and quiz generators
//! - `domain`: data structures
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Create and ingest a video resource
//! lectern create --owner <uuid> --kind video \
//!     --source "https://youtu.be/abcDEFghi12" --ingest
//!
//! # Generate study artifacts once a transcript exists
//! lectern cards <resource-id> --owner <uuid> --generate
//! lectern quiz  <resource-id> --owner <uuid> --generate
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod extract;
pub mod generate;
pub mod ingest;
pub mod store;

// Re-export main types at crate root for convenience
pub use adapters::Backends;
pub use domain::{
    FlashCard, Folder, NewResource, QuizQuestion, Resource, ResourceImage, ResourceStatus,
    ResourceType,
};
pub use extract::{Extraction, Extractor};
pub use ingest::{ingest_resource, IngestError};
pub use store::{RecordStore, SqliteStore, StoreError};
