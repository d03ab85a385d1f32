//! Anime Catalog Enricher Library
//!
//! Enriches a local JSON anime catalog with metadata, episode guides, music
//! themes and related seasons pulled from a Jikan-compatible REST API.

pub mod catalog;
pub mod config;
pub mod enrichment;
pub mod jikan;
pub mod progress;

// Re-export commonly used types for convenience
pub use catalog::{CatalogRecord, CatalogStore, JsonCatalogStore};
pub use config::{ApiSettings, AppConfig, PipelineConfig};
pub use enrichment::{run, EnrichmentKind, EnrichmentPipeline, PipelineError, Summary};
pub use jikan::{ApiError, JikanClient, MetadataApi};
