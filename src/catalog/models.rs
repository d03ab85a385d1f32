//! Catalog record models.
//!
//! These types match the JSON structure of the catalog file consumed by the
//! website. Fields the enricher does not know about are kept in
//! [`CatalogRecord::extra`] so a load/save round trip never drops data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Ratings key holding the score reported by the external metadata site.
pub const SITE_RATING_KEY: &str = "site";

/// Upper bound for any named sub-score.
pub const MAX_RATING: f64 = 10.0;

// =============================================================================
// Catalog Record
// =============================================================================

/// One anime entry of the catalog file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Stable local identifier, never touched by enrichment
    pub id: String,
    /// Display title, also the external search key
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Named sub-scores, each in [0, 10]
    #[serde(default, deserialize_with = "null_as_default")]
    pub ratings: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_guide: Option<Vec<Episode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<MusicThemes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Vec<RelatedEntry>>,
    /// External (MyAnimeList) identifier resolved by the metadata variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mal_id: Option<u64>,
    /// Airing status as reported by the external source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Every other field of the record, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn has_episode_guide(&self) -> bool {
        self.episode_guide.as_ref().is_some_and(|g| !g.is_empty())
    }

    pub fn has_music(&self) -> bool {
        self.music.as_ref().is_some_and(|m| !m.is_empty())
    }

    pub fn has_seasons(&self) -> bool {
        self.seasons.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// The site rating, if one is present and non-zero.
    pub fn site_rating(&self) -> Option<f64> {
        self.ratings
            .get(SITE_RATING_KEY)
            .copied()
            .filter(|r| *r > 0.0)
    }

    /// True for movies and other single-episode entries.
    pub fn is_single_episode(&self) -> bool {
        self.episodes == Some(1)
    }
}

// =============================================================================
// Episode Guide
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Episode number, reused from the external episode id
    pub number: u32,
    pub title: String,
    /// Air date exactly as the source reported it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filler: bool,
}

impl Episode {
    /// Title used when the source does not provide one.
    pub fn fallback_title(number: u32) -> String {
        format!("Episode {}", number)
    }
}

// =============================================================================
// Music Themes
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MusicThemes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub openings: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub endings: Vec<String>,
}

impl MusicThemes {
    pub fn is_empty(&self) -> bool {
        self.openings.is_empty() && self.endings.is_empty()
    }
}

// =============================================================================
// Related Seasons
// =============================================================================

/// An entry linked to a record (sequel, prequel, side story...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedEntry {
    /// External identifier, stringified
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Source-defined relation label, e.g. "Sequel" or "Side Story"
    pub relation_type: String,
}

/// Reads an explicit `null` as the type's default, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
