use crate::catalog::CatalogRecord;
use clap::ValueEnum;
use serde::Serialize;

/// Which part of a record an enrichment run fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentKind {
    /// Cover, synopsis, episode count, rank, status, year and site rating
    Metadata,
    /// Episode guide
    Episodes,
    /// Opening and ending themes
    Music,
    /// Related seasons (sequels, prequels, side stories...)
    Relations,
}

impl EnrichmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentKind::Metadata => "metadata",
            EnrichmentKind::Episodes => "episodes",
            EnrichmentKind::Music => "music",
            EnrichmentKind::Relations => "relations",
        }
    }

    /// Why `record` needs no work for this kind, or None if it should be enriched.
    ///
    /// Records that already carry the target data are skipped, which makes
    /// runs safe to repeat.
    pub fn skip_reason(&self, record: &CatalogRecord) -> Option<&'static str> {
        match self {
            EnrichmentKind::Metadata => {
                let complete = record.mal_id.is_some()
                    && !record.cover_image.trim().is_empty()
                    && !record.description.trim().is_empty()
                    && record.episodes.is_some()
                    && record.site_rating().is_some();
                complete.then_some("metadata already complete")
            }
            EnrichmentKind::Episodes => {
                if record.is_single_episode() {
                    Some("single-episode entry")
                } else if record.has_episode_guide() {
                    Some("episode guide already present")
                } else {
                    None
                }
            }
            EnrichmentKind::Music => record.has_music().then_some("music themes already present"),
            EnrichmentKind::Relations => record.has_seasons().then_some("seasons already present"),
        }
    }
}

impl std::fmt::Display for EnrichmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
