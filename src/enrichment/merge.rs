//! Right-biased fill merge rules.
//!
//! Fetched data fills what is missing and upgrades what is weaker, but never
//! blanks a populated field. Per field:
//!
//! | field                         | rule                                        |
//! |-------------------------------|---------------------------------------------|
//! | `malId`, `episodes`, `rank`, `score`, `status` | fetched wins when present   |
//! | `coverImage`, `description`, `year` | fill-only                             |
//! | `ratings.site`                | fill-only (existing value > 0 is kept)      |
//! | list fields                   | replaced when fetched is non-empty and at least as long |
//!
//! Every function returns true when the record changed.

use crate::catalog::{
    CatalogRecord, Episode, MusicThemes, RelatedEntry, MAX_RATING, SITE_RATING_KEY,
};
use crate::jikan::{AnimeSummary, EpisodeEntry, Themes};

// =============================================================================
// Field primitives
// =============================================================================

/// Sets `existing` to `fetched` only when `existing` is blank.
pub fn fill_text(existing: &mut String, fetched: Option<&str>) -> bool {
    match fetched.map(str::trim).filter(|f| !f.is_empty()) {
        Some(value) if existing.trim().is_empty() => {
            *existing = value.to_string();
            true
        }
        _ => false,
    }
}

/// Sets `existing` to `fetched` only when `existing` is None.
pub fn fill_option<T>(existing: &mut Option<T>, fetched: Option<T>) -> bool {
    match fetched {
        Some(value) if existing.is_none() => {
            *existing = Some(value);
            true
        }
        _ => false,
    }
}

/// Replaces `existing` whenever a value was fetched.
pub fn upgrade_option<T: PartialEq>(existing: &mut Option<T>, fetched: Option<T>) -> bool {
    match fetched {
        Some(value) if existing.as_ref() != Some(&value) => {
            *existing = Some(value);
            true
        }
        _ => false,
    }
}

/// Keeps a positive site rating, otherwise takes the fetched score.
pub fn fill_site_rating(record: &mut CatalogRecord, fetched: Option<f64>) -> bool {
    if record.site_rating().is_some() {
        return false;
    }
    match fetched.filter(|s| s.is_finite() && *s > 0.0) {
        Some(score) => {
            record
                .ratings
                .insert(SITE_RATING_KEY.to_string(), score.clamp(0.0, MAX_RATING));
            true
        }
        None => false,
    }
}

/// Replaces a list when the fetched one (capped to `cap`) is non-empty and no
/// shorter than what is stored.
pub fn merge_list<T: PartialEq>(existing: &mut Vec<T>, mut fetched: Vec<T>, cap: usize) -> bool {
    fetched.truncate(cap);
    if fetched.is_empty() || fetched.len() < existing.len() || *existing == fetched {
        return false;
    }
    *existing = fetched;
    true
}

fn merge_optional_list<T: PartialEq>(
    existing: &mut Option<Vec<T>>,
    fetched: Vec<T>,
    cap: usize,
) -> bool {
    let was_missing = existing.is_none();
    let changed = merge_list(existing.get_or_insert_with(Vec::new), fetched, cap);
    if was_missing && !changed {
        *existing = None;
    }
    changed
}

// =============================================================================
// Per-kind merges
// =============================================================================

/// Merges search and detail data into the record's general metadata.
/// Detail values are preferred over search values when both are present.
pub fn merge_metadata(
    record: &mut CatalogRecord,
    search: &AnimeSummary,
    detail: Option<&AnimeSummary>,
) -> bool {
    let pick = |f: fn(&AnimeSummary) -> Option<&str>| -> Option<String> {
        detail.and_then(f).or_else(|| f(search)).map(str::to_string)
    };

    let mut changed = false;
    changed |= upgrade_option(&mut record.mal_id, Some(search.mal_id));
    changed |= upgrade_option(
        &mut record.episodes,
        detail.and_then(|d| d.episodes).or(search.episodes),
    );
    changed |= upgrade_option(
        &mut record.rank,
        detail.and_then(|d| d.rank).or(search.rank),
    );
    let score = detail
        .and_then(|d| d.score)
        .or(search.score)
        .filter(|s| s.is_finite());
    changed |= upgrade_option(&mut record.score, score);
    changed |= upgrade_option(&mut record.status, pick(AnimeSummary::status));
    changed |= fill_text(
        &mut record.cover_image,
        search.cover_image().or_else(|| detail.and_then(AnimeSummary::cover_image)),
    );
    changed |= fill_text(&mut record.description, pick(AnimeSummary::synopsis).as_deref());
    changed |= fill_option(
        &mut record.year,
        detail
            .and_then(AnimeSummary::release_year)
            .or_else(|| search.release_year()),
    );
    changed |= fill_site_rating(record, score);
    changed
}

pub fn merge_episode_guide(record: &mut CatalogRecord, episodes: Vec<Episode>, cap: usize) -> bool {
    merge_optional_list(&mut record.episode_guide, episodes, cap)
}

/// Merges openings and endings independently.
pub fn merge_music(record: &mut CatalogRecord, fetched: MusicThemes, cap: usize) -> bool {
    let had_music = record.music.is_some();
    let music = record.music.get_or_insert_with(MusicThemes::default);
    let mut changed = merge_list(&mut music.openings, fetched.openings, cap);
    changed |= merge_list(&mut music.endings, fetched.endings, cap);
    if !had_music && !changed {
        record.music = None;
    }
    changed
}

pub fn merge_seasons(record: &mut CatalogRecord, seasons: Vec<RelatedEntry>, cap: usize) -> bool {
    merge_optional_list(&mut record.seasons, seasons, cap)
}

// =============================================================================
// Conversions from API models
// =============================================================================

/// Converts an API episode. Entries without a positive number are dropped.
pub fn to_episode(entry: EpisodeEntry) -> Option<Episode> {
    if entry.mal_id == 0 {
        return None;
    }
    let title = entry
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| Episode::fallback_title(entry.mal_id));
    Some(Episode {
        number: entry.mal_id,
        title,
        air_date: entry.aired.filter(|a| !a.trim().is_empty()),
        score: entry.score.filter(|s| s.is_finite()),
        filler: entry.filler.unwrap_or(false),
    })
}

pub fn to_music_themes(themes: Themes) -> MusicThemes {
    let clean = |list: Vec<String>| -> Vec<String> {
        list.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };
    MusicThemes {
        openings: clean(themes.openings),
        endings: clean(themes.endings),
    }
}
