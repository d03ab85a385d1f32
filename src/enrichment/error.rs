use super::retry_policy::RetryExhausted;
use crate::catalog::CatalogError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Catalog file not found: {0:?}")]
    CatalogNotFound(PathBuf),

    #[error("Failed to load catalog: {0}")]
    Load(#[source] CatalogError),

    #[error("Checkpoint after {processed} records failed: {source}")]
    CheckpointWrite {
        processed: usize,
        #[source]
        source: CatalogError,
    },

    #[error("Final catalog write failed: {0}")]
    FinalWrite(#[source] CatalogError),

    #[error("Failed to create metadata API client: {0}")]
    Client(#[source] reqwest::Error),
}

impl From<CatalogError> for PipelineError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(path) => PipelineError::CatalogNotFound(path),
            other => PipelineError::Load(other),
        }
    }
}

/// Errors scoped to a single record. These are counted, never propagated.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("no external match")]
    LookupMiss,

    #[error(transparent)]
    FetchFailed(#[from] RetryExhausted),

    #[error("external source returned no data")]
    NoData,
}
