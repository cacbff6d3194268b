//! Resource ingestion pipeline.
//!
//! One invocation per resource, spawned as an independent task when the
//! resource is created:
//!
//! ```text
//! processing --(extractor exists for type)--> extracting --> summarizing --> completed
//! processing --(no extractor, e.g. plain text)-----------> summarizing --> completed
//! any non-terminal state --(unhandled error)--> failed
//! ```
//!
//! Extraction, summarization, and title generation each degrade internally
//! rather than raising, so `failed` is reserved for structural problems:
//! the record disappearing mid-pipeline, a status write failing. A resource
//! almost always reaches `completed`, even when its transcript is a
//! diagnostic message rather than usable text.

pub mod summary;
pub mod title;

use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::Backends;
use crate::domain::{Resource, ResourceStatus};
use crate::extract::Extractor;
use crate::store::{RecordStore, StoreError};

pub use title::TitleSource;

/// Errors escaping the ingestion pipeline. Both variants are fatal for the
/// run; `ResourceNotFound` is the only one raised before any mutation.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("resource not found: {0}")]
    ResourceNotFound(Uuid),

    #[error("ingestion failed: {0}")]
    Stage(anyhow::Error),
}

/// Run the ingestion pipeline for one resource.
///
/// Returns the resource in its terminal state on success. On a structural
/// failure the resource is marked `failed` (when it still exists) and the
/// error is re-raised for the caller to log.
#[instrument(skip(store, backends), fields(%resource_id))]
pub async fn ingest_resource(
    store: &dyn RecordStore,
    backends: &Backends,
    resource_id: Uuid,
    owner_id: Uuid,
) -> Result<Resource, IngestError> {
    let resource = match store.resource(resource_id, owner_id) {
        Ok(resource) => resource,
        Err(StoreError::NotFound) => return Err(IngestError::ResourceNotFound(resource_id)),
        Err(e) => return Err(IngestError::Stage(e.into())),
    };

    info!(resource_type = %resource.resource_type, "ingesting resource");

    match run_stages(store, backends, resource).await {
        Ok(resource) => {
            info!("resource ingested successfully");
            Ok(resource)
        }
        Err(e) => {
            error!(error = %e, "ingestion failed");
            // Reload before marking: the failure may be the record itself
            // having gone away.
            match store.resource(resource_id, owner_id) {
                Ok(_) => {
                    if let Err(mark) =
                        store.set_status(resource_id, owner_id, ResourceStatus::Failed)
                    {
                        error!(error = %mark, "could not record failed status");
                    }
                }
                Err(load) => {
                    error!(error = %load, "resource gone while recording failure");
                }
            }
            Err(IngestError::Stage(e))
        }
    }
}

async fn run_stages(
    store: &dyn RecordStore,
    backends: &Backends,
    mut resource: Resource,
) -> anyhow::Result<Resource> {
    if let Some(extractor) = Extractor::for_type(resource.resource_type) {
        store.set_status(resource.id, resource.owner_id, ResourceStatus::Extracting)?;
        resource.status = ResourceStatus::Extracting;

        let extraction = extractor.extract(&resource, store, backends).await;
        if extraction.is_degraded() {
            warn!(reason = extraction.text(), "extraction degraded to placeholder");
        }
        store.set_transcript(resource.id, resource.owner_id, extraction.text())?;
    }

    store.set_status(resource.id, resource.owner_id, ResourceStatus::Summarizing)?;
    resource.status = ResourceStatus::Summarizing;

    summary::summarize(store, backends, &resource).await;

    // The summarizer just wrote fields this snapshot predates.
    let resource = store.resource(resource.id, resource.owner_id)?;

    title::generate(store, backends, &resource).await;

    store.set_status(resource.id, resource.owner_id, ResourceStatus::Completed)?;
    let resource = store.resource(resource.id, resource.owner_id)?;

    Ok(resource)
}
