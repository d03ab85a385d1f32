//! Test fixture creation
//!
//! Mock API data and temporary catalog files.

use super::constants::*;
use anime_catalog_enricher::PipelineConfig;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An anime served by the mock metadata API.
#[derive(Debug, Clone, Default)]
pub struct MockAnime {
    pub mal_id: u64,
    pub title: String,
    pub episodes: u32,
    pub score: Option<f64>,
    pub synopsis: Option<String>,
    pub large_image: Option<String>,
    pub image: Option<String>,
    pub year: Option<i32>,
    pub openings: Vec<String>,
    pub endings: Vec<String>,
    /// (relation, mal_id, type, name)
    pub relations: Vec<(String, u64, String, String)>,
}

impl MockAnime {
    pub fn new(mal_id: u64, title: &str, episodes: u32) -> Self {
        Self {
            mal_id,
            title: title.to_string(),
            episodes,
            ..Default::default()
        }
    }

    /// JSON shape of search results and `/anime/{id}`.
    pub fn to_json(&self) -> Value {
        json!({
            "mal_id": self.mal_id,
            "title": self.title,
            "episodes": self.episodes,
            "rank": self.mal_id,
            "score": self.score,
            "status": "Finished Airing",
            "images": {
                "jpg": {
                    "image_url": self.image,
                    "large_image_url": self.large_image,
                }
            },
            "synopsis": self.synopsis,
            "year": self.year,
        })
    }
}

/// The anime known to the mock API.
pub fn mock_anime() -> Vec<MockAnime> {
    let example_show = MockAnime {
        score: Some(EXAMPLE_SHOW_SCORE),
        synopsis: Some("A show used in tests.".to_string()),
        large_image: Some(EXAMPLE_SHOW_COVER.to_string()),
        image: Some("https://cdn.example.test/100/small.jpg".to_string()),
        year: Some(2014),
        openings: vec!["1: \"First Light\" by The Testers (eps 1-12)".to_string()],
        endings: vec![
            "1: \"Goodnight\" by The Testers (eps 1-6)".to_string(),
            "2: \"Good Morning\" by The Testers (eps 7-12)".to_string(),
        ],
        relations: vec![
            (
                "Sequel".to_string(),
                SEQUEL_ID,
                "anime".to_string(),
                SEQUEL_TITLE.to_string(),
            ),
            (
                "Adaptation".to_string(),
                MANGA_ID,
                "manga".to_string(),
                "Example Show (Manga)".to_string(),
            ),
        ],
        ..MockAnime::new(EXAMPLE_SHOW_ID, EXAMPLE_SHOW_TITLE, EXAMPLE_SHOW_EPISODES)
    };

    let sequel = MockAnime {
        image: Some(SEQUEL_IMAGE.to_string()),
        year: Some(SEQUEL_YEAR),
        ..MockAnime::new(SEQUEL_ID, SEQUEL_TITLE, 12)
    };

    vec![
        example_show,
        sequel,
        MockAnime::new(EXAMPLE_MOVIE_ID, EXAMPLE_MOVIE_TITLE, 1),
        MockAnime::new(LONG_RUNNER_ID, LONG_RUNNER_TITLE, LONG_RUNNER_EPISODES),
        MockAnime::new(BUSY_SHOW_ID, BUSY_SHOW_TITLE, 24),
        MockAnime::new(BROKEN_SHOW_ID, BROKEN_SHOW_TITLE, 24),
    ]
}

/// Pipeline settings for tests: no pacing, no backoff.
pub fn test_config(base_url: &str) -> PipelineConfig {
    let mut config = PipelineConfig {
        request_interval_ms: 0,
        retry_backoff_ms: 0,
        ..Default::default()
    };
    config.api.base_url = base_url.to_string();
    config.api.request_timeout_secs = 5;
    config
}

/// Writes `records` as a catalog file in a fresh temporary directory.
pub fn create_test_catalog(records: Value) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("anime.json");
    let json = serde_json::to_string_pretty(&records).expect("Failed to serialize catalog");
    std::fs::write(&path, json).expect("Failed to write catalog");
    (dir, path)
}

/// Reads a catalog file back as raw JSON records.
pub fn read_catalog(path: &Path) -> Vec<Value> {
    let content = std::fs::read_to_string(path).expect("Failed to read catalog");
    serde_json::from_str(&content).expect("Catalog is not a JSON array")
}
