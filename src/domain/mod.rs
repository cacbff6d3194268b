//! Domain types for lectern.
//!
//! This module contains the core data structures:
//! - Resource: a user's uploaded/linked piece of source material
//! - FlashCard / QuizQuestion: study artifacts derived from a transcript
//! - ResourceImage: uploaded pages of an image-set resource
//! - Folder: per-user hierarchical container for resources

pub mod artifact;
pub mod resource;

// Re-export commonly used types
pub use artifact::{FlashCard, NewFlashCard, NewQuizQuestion, QuizQuestion, ResourceImage};
pub use resource::{Folder, NewResource, Resource, ResourceStatus, ResourceType};
