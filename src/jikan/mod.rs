//! Client for the Jikan (unofficial MyAnimeList) REST API.
//!
//! Only the read-only endpoints used for enrichment are covered:
//! - anime search by title
//! - anime detail
//! - episodes, themes and relations sub-resources

mod client;
mod models;

pub use client::{ApiError, EpisodePage, JikanClient, MetadataApi, DEFAULT_BASE_URL};
pub use models::*;
