//! Shared constants for end-to-end tests
//!
//! Every anime served by the mock metadata API is listed here. When the mock
//! data changes, update only this file and `fixtures.rs`.

// ============================================================================
// Mock anime
// ============================================================================

/// Regular 12-episode TV series with themes and relations
pub const EXAMPLE_SHOW_ID: u64 = 100;
pub const EXAMPLE_SHOW_TITLE: &str = "Example Show";
pub const EXAMPLE_SHOW_EPISODES: u32 = 12;
pub const EXAMPLE_SHOW_SCORE: f64 = 8.25;
pub const EXAMPLE_SHOW_COVER: &str = "https://cdn.example.test/100/large.jpg";

/// Sequel of Example Show
pub const SEQUEL_ID: u64 = 101;
pub const SEQUEL_TITLE: &str = "Example Show Season 2";
pub const SEQUEL_YEAR: i32 = 2016;
pub const SEQUEL_IMAGE: &str = "https://cdn.example.test/101/small.jpg";

/// Manga adaptation listed among Example Show's relations
pub const MANGA_ID: u64 = 9001;

/// Single-episode movie
pub const EXAMPLE_MOVIE_ID: u64 = 200;
pub const EXAMPLE_MOVIE_TITLE: &str = "Example Movie";

/// Long-running series spanning several episode pages
pub const LONG_RUNNER_ID: u64 = 300;
pub const LONG_RUNNER_TITLE: &str = "Long Runner";
pub const LONG_RUNNER_EPISODES: u32 = 250;

/// Every sub-resource of this anime answers HTTP 429
pub const BUSY_SHOW_ID: u64 = 400;
pub const BUSY_SHOW_TITLE: &str = "Busy Show";

/// Episode list of this anime is not a list
pub const BROKEN_SHOW_ID: u64 = 500;
pub const BROKEN_SHOW_TITLE: &str = "Broken Show";

/// Title with no match on the mock API
pub const UNKNOWN_TITLE: &str = "Nobody Has Heard Of This";

// ============================================================================
// Mock API behavior
// ============================================================================

/// Episodes per page, as the real API paginates
pub const EPISODES_PAGE_SIZE: u32 = 100;
