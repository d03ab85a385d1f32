//! Response schemas for the Jikan API.
//!
//! Every nested field is optional: a missing or null value is treated as
//! "no data" rather than a decoding failure. Only a structurally different
//! document (e.g. `data` not being a list where one is expected) fails to
//! decode.

use serde::Deserialize;

// =============================================================================
// Envelopes
// =============================================================================

/// `{ "data": [...], "pagination": {...} }`
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// `{ "data": {...} }`
#[derive(Debug, Deserialize)]
pub struct ItemResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub last_visible_page: Option<u32>,
}

// =============================================================================
// Anime
// =============================================================================

/// Anime as returned by search and detail endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimeSummary {
    pub mal_id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub aired: Option<Aired>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub jpg: Option<ImageSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Aired {
    #[serde(default)]
    pub prop: Option<AiredProp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiredProp {
    #[serde(default)]
    pub from: Option<DateParts>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateParts {
    #[serde(default)]
    pub year: Option<i32>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl AnimeSummary {
    fn jpg(&self) -> Option<&ImageSet> {
        self.images.as_ref().and_then(|i| i.jpg.as_ref())
    }

    pub fn large_image_url(&self) -> Option<&str> {
        non_empty(self.jpg().and_then(|j| j.large_image_url.as_ref()))
    }

    pub fn image_url(&self) -> Option<&str> {
        non_empty(self.jpg().and_then(|j| j.image_url.as_ref()))
    }

    /// Best available cover: the large variant, else the regular one.
    pub fn cover_image(&self) -> Option<&str> {
        self.large_image_url().or_else(|| self.image_url())
    }

    pub fn synopsis(&self) -> Option<&str> {
        non_empty(self.synopsis.as_ref())
    }

    pub fn status(&self) -> Option<&str> {
        non_empty(self.status.as_ref())
    }

    /// Premiere year, falling back to the start of the airing period.
    pub fn release_year(&self) -> Option<i32> {
        self.year.or_else(|| {
            self.aired
                .as_ref()
                .and_then(|a| a.prop.as_ref())
                .and_then(|p| p.from.as_ref())
                .and_then(|f| f.year)
        })
    }
}

// =============================================================================
// Sub-resources
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeEntry {
    pub mal_id: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub aired: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub filler: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Themes {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub openings: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub endings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationGroup {
    pub relation: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub entry: Vec<RelationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationEntry {
    pub mal_id: u64,
    /// "anime" or "manga"
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl RelationEntry {
    pub fn is_anime(&self) -> bool {
        self.kind.eq_ignore_ascii_case("anime")
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
