//! Blocking HTTP client for the Jikan API.
//!
//! The client itself does not pace requests: the enrichment pipeline owns the
//! rate limiter and the retry policy, so every call here is a single attempt.

use super::models::{
    AnimeSummary, EpisodeEntry, ItemResponse, ListResponse, RelationGroup, Themes,
};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.jikan.moe/v4";

/// Errors returned by a single API call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response shape: {0}")]
    Schema(String),
}

impl ApiError {
    /// Returns true if repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::Schema(_))
    }
}

/// One page of an anime's episode list.
#[derive(Debug, Clone, Default)]
pub struct EpisodePage {
    pub episodes: Vec<EpisodeEntry>,
    pub has_next_page: bool,
    /// Last page number, when the source reports it
    pub last_page: Option<u32>,
}

impl EpisodePage {
    /// Whether a page after `page` may still hold episodes.
    pub fn has_more_after(&self, page: u32) -> bool {
        self.has_next_page && self.last_page.map_or(true, |last| page < last)
    }
}

/// Read-only access to the external metadata source.
pub trait MetadataApi {
    /// Best match for `title`, if any.
    fn search(&self, title: &str) -> Result<Option<AnimeSummary>, ApiError>;

    fn anime(&self, mal_id: u64) -> Result<Option<AnimeSummary>, ApiError>;

    /// Episodes page, 1-based.
    fn episodes(&self, mal_id: u64, page: u32) -> Result<EpisodePage, ApiError>;

    fn themes(&self, mal_id: u64) -> Result<Themes, ApiError>;

    fn relations(&self, mal_id: u64) -> Result<Vec<RelationGroup>, ApiError>;
}

impl<T: MetadataApi + ?Sized> MetadataApi for &T {
    fn search(&self, title: &str) -> Result<Option<AnimeSummary>, ApiError> {
        (**self).search(title)
    }

    fn anime(&self, mal_id: u64) -> Result<Option<AnimeSummary>, ApiError> {
        (**self).anime(mal_id)
    }

    fn episodes(&self, mal_id: u64, page: u32) -> Result<EpisodePage, ApiError> {
        (**self).episodes(mal_id, page)
    }

    fn themes(&self, mal_id: u64) -> Result<Themes, ApiError> {
        (**self).themes(mal_id)
    }

    fn relations(&self, mal_id: u64) -> Result<Vec<RelationGroup>, ApiError> {
        (**self).relations(mal_id)
    }
}

pub struct JikanClient {
    client: Client,
    base_url: String,
}

impl JikanClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g., "https://api.jikan.moe/v4")
    /// * `user_agent` - User-Agent header sent with every request
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, title: &str) -> String {
        format!(
            "{}/anime?q={}&limit=1",
            self.base_url,
            urlencoding::encode(title)
        )
    }

    fn anime_url(&self, mal_id: u64, resource: Option<&str>) -> String {
        match resource {
            Some(resource) => format!("{}/anime/{}/{}", self.base_url, mal_id, resource),
            None => format!("{}/anime/{}", self.base_url, mal_id),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Schema(e.to_string()))
    }
}

impl MetadataApi for JikanClient {
    fn search(&self, title: &str) -> Result<Option<AnimeSummary>, ApiError> {
        let body: ListResponse<AnimeSummary> = self.get_json(&self.search_url(title))?;
        Ok(body.data.into_iter().next())
    }

    fn anime(&self, mal_id: u64) -> Result<Option<AnimeSummary>, ApiError> {
        let body: ItemResponse<AnimeSummary> = self.get_json(&self.anime_url(mal_id, None))?;
        Ok(body.data)
    }

    fn episodes(&self, mal_id: u64, page: u32) -> Result<EpisodePage, ApiError> {
        let url = format!("{}?page={}", self.anime_url(mal_id, Some("episodes")), page);
        let body: ListResponse<EpisodeEntry> = self.get_json(&url)?;
        let pagination = body.pagination.unwrap_or_default();
        Ok(EpisodePage {
            episodes: body.data,
            has_next_page: pagination.has_next_page,
            last_page: pagination.last_visible_page,
        })
    }

    fn themes(&self, mal_id: u64) -> Result<Themes, ApiError> {
        let body: ItemResponse<Themes> = self.get_json(&self.anime_url(mal_id, Some("themes")))?;
        Ok(body.data.unwrap_or_default())
    }

    fn relations(&self, mal_id: u64) -> Result<Vec<RelationGroup>, ApiError> {
        let body: ListResponse<RelationGroup> =
            self.get_json(&self.anime_url(mal_id, Some("relations")))?;
        Ok(body.data)
    }
}
