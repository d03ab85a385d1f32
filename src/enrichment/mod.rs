//! Catalog enrichment: per-record fetch, merge and checkpointed save.

mod error;
mod kind;
pub mod merge;
mod pipeline;
mod rate_limiter;
pub mod retry_policy;
mod summary;

pub use error::{PipelineError, RecordError};
pub use kind::EnrichmentKind;
pub use pipeline::EnrichmentPipeline;
pub use rate_limiter::RateLimiter;
pub use retry_policy::{retry_with_backoff, RetryExhausted, RetryPolicy};
pub use summary::{FailedRecord, RecordOutcome, RunReport, Summary};

use crate::catalog::JsonCatalogStore;
use crate::config::PipelineConfig;
use crate::jikan::JikanClient;
use std::path::Path;

/// Enrich the catalog at `catalog_path` in place with the live API.
///
/// Fails before any request is sent when the catalog file does not exist.
pub fn run(
    catalog_path: &Path,
    kind: EnrichmentKind,
    config: &PipelineConfig,
) -> Result<Summary, PipelineError> {
    if !catalog_path.exists() {
        return Err(PipelineError::CatalogNotFound(catalog_path.to_path_buf()));
    }

    let api = JikanClient::new(
        &config.api.base_url,
        &config.api.user_agent,
        config.api.request_timeout(),
    )
    .map_err(PipelineError::Client)?;
    let store = JsonCatalogStore::new(catalog_path);

    EnrichmentPipeline::new(api, store, config.clone()).run(kind)
}
