//! Command-line interface for lectern.
//!
//! Provides commands for creating resources, running ingestion, inspecting
//! results, and generating study artifacts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::adapters::{Backends, BlobStore, S3HttpStore};
use crate::config;
use crate::domain::{NewResource, ResourceType};
use crate::generate::{generate_flash_cards, generate_quiz_questions};
use crate::ingest::ingest_resource;
use crate::store::{RecordStore, SqliteStore};

/// lectern - study-resource ingestion engine
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Resource kind as spelled on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ResourceKind {
    Video,
    Document,
    Audio,
    Text,
    Images,
}

impl From<ResourceKind> for ResourceType {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Video => ResourceType::WebVideoLink,
            ResourceKind::Document => ResourceType::Document,
            ResourceKind::Audio => ResourceType::Audio,
            ResourceKind::Text => ResourceType::PlainText,
            ResourceKind::Images => ResourceType::ImageSet,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a resource and print its id
    Create {
        #[arg(long)]
        owner: Uuid,

        #[arg(long, value_enum)]
        kind: ResourceKind,

        /// Source URL or blob locator (video/document/audio)
        #[arg(long)]
        source: Option<String>,

        /// Inline content (text resources)
        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// Containing folder id
        #[arg(long)]
        folder: Option<i64>,

        /// Run ingestion immediately after creating
        #[arg(long)]
        ingest: bool,
    },

    /// Attach an uploaded image to an image-set resource
    AddImage {
        resource: Uuid,

        /// Blob locator of the uploaded image
        locator: String,

        #[arg(long)]
        owner: Uuid,
    },

    /// Run the ingestion pipeline for a resource
    Ingest {
        resource: Uuid,

        #[arg(long)]
        owner: Uuid,
    },

    /// Show a resource's status and derived fields
    Status {
        resource: Uuid,

        #[arg(long)]
        owner: Uuid,
    },

    /// Print a resource's transcript
    Transcript {
        resource: Uuid,

        #[arg(long)]
        owner: Uuid,
    },

    /// List (or first generate) flash cards for a resource
    Cards {
        resource: Uuid,

        #[arg(long)]
        owner: Uuid,

        /// Generate cards before listing
        #[arg(long)]
        generate: bool,
    },

    /// List (or first generate) quiz questions for a resource
    Quiz {
        resource: Uuid,

        #[arg(long)]
        owner: Uuid,

        /// Generate questions before listing
        #[arg(long)]
        generate: bool,
    },

    /// Manage folders
    Folder {
        #[command(subcommand)]
        command: FolderCommands,
    },

    /// Delete a resource and its artifacts
    Delete {
        resource: Uuid,

        #[arg(long)]
        owner: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum FolderCommands {
    /// Create a folder
    Create {
        name: String,

        #[arg(long)]
        owner: Uuid,

        #[arg(long)]
        parent: Option<i64>,
    },

    /// List one folder level (root when no folder is given)
    List {
        #[arg(long)]
        owner: Uuid,

        #[arg(long)]
        folder: Option<i64>,
    },

    /// Recursively delete a folder and its contents
    Delete {
        folder: i64,

        #[arg(long)]
        owner: Uuid,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = config::config()?;

        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let store = SqliteStore::open(&config.db_path)
            .with_context(|| format!("Failed to open store at {}", config.db_path.display()))?;

        match self.command {
            Commands::Create {
                owner,
                kind,
                source,
                content,
                title,
                folder,
                ingest,
            } => {
                let mut new = NewResource::new(owner, kind.into());
                new.source_locator = source;
                new.inline_content = content;
                new.title = title;
                new.folder_id = folder;

                let resource = store.create_resource(new)?;
                println!("{}", resource.id);

                if ingest {
                    let backends = Backends::from_config(config)?;
                    let resource =
                        ingest_resource(&store, &backends, resource.id, owner).await?;
                    println!("status: {}", resource.status);
                }
            }

            Commands::AddImage {
                resource,
                locator,
                owner,
            } => {
                let image = store.add_image(resource, owner, &locator)?;
                println!("image {} attached", image.id);
            }

            Commands::Ingest { resource, owner } => {
                let backends = Backends::from_config(config)?;
                let resource = ingest_resource(&store, &backends, resource, owner).await?;
                println!("status: {}", resource.status);
                if let Some(title) = &resource.title {
                    println!("title:  {title}");
                }
            }

            Commands::Status { resource, owner } => {
                let resource = store.resource(resource, owner)?;
                println!("id:      {}", resource.id);
                println!("type:    {}", resource.resource_type);
                println!("status:  {}", resource.status);
                println!("title:   {}", resource.title.as_deref().unwrap_or("-"));
                println!("glyph:   {}", resource.glyph.as_deref().unwrap_or("-"));
                println!("created: {}", resource.created_at);
                println!("updated: {}", resource.updated_at);
                if let Some(notes) = &resource.summary_notes {
                    println!("\n{notes}");
                }
            }

            Commands::Transcript { resource, owner } => {
                match store.transcript(resource, owner)? {
                    Some(transcript) => println!("{transcript}"),
                    None => println!("(no transcript)"),
                }
            }

            Commands::Cards {
                resource,
                owner,
                generate,
            } => {
                if generate {
                    let backends = Backends::from_config(config)?;
                    let count =
                        generate_flash_cards(&store, &backends, resource, owner).await?;
                    println!("generated {count} cards");
                }
                for card in store.flash_cards(resource, owner)? {
                    println!("[{}]", card.id);
                    println!("  front: {}", card.front);
                    println!("  back:  {}", card.back);
                }
            }

            Commands::Quiz {
                resource,
                owner,
                generate,
            } => {
                if generate {
                    let backends = Backends::from_config(config)?;
                    let count =
                        generate_quiz_questions(&store, &backends, resource, owner).await?;
                    println!("generated {count} questions");
                }
                for question in store.quiz_questions(resource, owner)? {
                    println!("[{}] {}", question.id, question.question);
                    for option in &question.options {
                        let marker = if option == &question.correct_option {
                            "*"
                        } else {
                            " "
                        };
                        println!("  {marker} {option}");
                    }
                }
            }

            Commands::Folder { command } => match command {
                FolderCommands::Create {
                    name,
                    owner,
                    parent,
                } => {
                    let folder = store.create_folder(owner, &name, parent)?;
                    println!("{}", folder.id);
                }
                FolderCommands::List { owner, folder } => {
                    let contents = store.folder_contents(owner, folder)?;
                    for folder in &contents.folders {
                        println!("folder   {:>6}  {}", folder.id, folder.name);
                    }
                    for resource in &contents.resources {
                        println!(
                            "resource {}  [{}] {}",
                            resource.id,
                            resource.status,
                            resource.title.as_deref().unwrap_or("(untitled)")
                        );
                    }
                }
                FolderCommands::Delete { folder, owner } => {
                    let released = store.delete_folder(owner, folder)?;
                    release_blobs(config, &released.locators).await;
                    println!("folder {folder} deleted");
                }
            },

            Commands::Delete { resource, owner } => {
                let released = store.delete_resource(resource, owner)?;
                release_blobs(config, &released.locators).await;
                println!("resource {resource} deleted");
            }
        }

        Ok(())
    }
}

/// Best-effort blob cleanup after a cascade delete.
async fn release_blobs(config: &crate::config::ResolvedConfig, locators: &[String]) {
    if locators.is_empty() {
        return;
    }
    let blob = S3HttpStore::new(&config.region);
    for locator in locators {
        if let Err(e) = blob.delete(locator).await {
            eprintln!("warning: failed to delete blob {locator}: {e}");
        }
    }
}
