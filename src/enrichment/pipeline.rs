//! The enrichment pipeline.
//!
//! ## Per record
//!
//! ```text
//! skip check → search by title → fetch sub-resource(s) → merge → (checkpoint)
//! ```
//!
//! Every request goes through the pipeline's own rate limiter and retry
//! policy. Per-record failures are counted and logged, never propagated; only
//! catalog I/O aborts a run.

use super::error::{PipelineError, RecordError};
use super::merge;
use super::rate_limiter::RateLimiter;
use super::retry_policy::{retry_with_backoff, RetryExhausted, RetryPolicy};
use super::summary::{RecordOutcome, Summary};
use super::EnrichmentKind;
use crate::catalog::{CatalogRecord, CatalogStore, RelatedEntry, SavePhase};
use crate::config::PipelineConfig;
use crate::jikan::{AnimeSummary, ApiError, MetadataApi};
use indicatif::ProgressBar;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub struct EnrichmentPipeline<A, S> {
    api: A,
    store: S,
    config: PipelineConfig,
    limiter: RateLimiter,
    retry_policy: RetryPolicy,
    progress: ProgressBar,
}

impl<A: MetadataApi, S: CatalogStore> EnrichmentPipeline<A, S> {
    pub fn new(api: A, store: S, config: PipelineConfig) -> Self {
        let limiter = RateLimiter::new(config.request_interval());
        let retry_policy = RetryPolicy::new(&config);
        Self {
            api,
            store,
            config,
            limiter,
            retry_policy,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on `progress` instead of a hidden bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Requests sent to the API so far, retries included.
    pub fn requests_issued(&self) -> u64 {
        self.limiter.requests_issued()
    }

    /// Enrich every record of the catalog, in on-disk order.
    pub fn run(&self, kind: EnrichmentKind) -> Result<Summary, PipelineError> {
        let mut records = self.store.load()?;
        let total = self
            .config
            .limit
            .map_or(records.len(), |limit| limit.min(records.len()));

        info!(
            "Enriching {} of {} records ({}) from {:?}",
            total,
            records.len(),
            kind,
            self.store.location()
        );
        if self.config.dry_run {
            info!("Dry run: the catalog file will not be written");
        }

        self.progress.set_length(total as u64);
        let mut summary = Summary::new(total);

        for index in 0..total {
            let record = &mut records[index];
            let outcome = self.process_record(kind, record);
            self.report(index, total, record, &outcome);
            summary.record(record, &outcome);

            let processed = index + 1;
            if self.is_checkpoint(processed, total) {
                self.save(&records, SavePhase::Checkpoint { processed })?;
            }
        }

        self.save(&records, SavePhase::Final)?;
        self.progress.finish_and_clear();

        info!(
            "Finished {} enrichment: {} updated, {} skipped, {} failed, {} requests",
            kind,
            summary.updated,
            summary.skipped,
            summary.failed,
            self.requests_issued()
        );
        Ok(summary)
    }

    fn process_record(&self, kind: EnrichmentKind, record: &mut CatalogRecord) -> RecordOutcome {
        if let Some(reason) = kind.skip_reason(record) {
            return RecordOutcome::Skipped(reason);
        }

        let anime = match self.request(|api| api.search(&record.title)) {
            Ok(Some(anime)) => anime,
            Ok(None) => {
                return RecordOutcome::Failed {
                    mal_id: None,
                    error: RecordError::LookupMiss,
                }
            }
            Err(e) => {
                return RecordOutcome::Failed {
                    mal_id: None,
                    error: e.into(),
                }
            }
        };
        let mal_id = anime.mal_id;
        debug!("Resolved \"{}\" to mal_id {}", record.title, mal_id);

        let result = match kind {
            EnrichmentKind::Metadata => self.enrich_metadata(record, &anime),
            EnrichmentKind::Episodes => self.enrich_episodes(record, mal_id),
            EnrichmentKind::Music => self.enrich_music(record, mal_id),
            EnrichmentKind::Relations => self.enrich_relations(record, mal_id),
        };

        match result {
            Ok(true) => RecordOutcome::Updated { mal_id },
            Ok(false) => RecordOutcome::Skipped("already up to date"),
            Err(error) => RecordOutcome::Failed {
                mal_id: Some(mal_id),
                error,
            },
        }
    }

    fn enrich_metadata(
        &self,
        record: &mut CatalogRecord,
        anime: &AnimeSummary,
    ) -> Result<bool, RecordError> {
        let detail = self.request(|api| api.anime(anime.mal_id))?;
        Ok(merge::merge_metadata(record, anime, detail.as_ref()))
    }

    fn enrich_episodes(&self, record: &mut CatalogRecord, mal_id: u64) -> Result<bool, RecordError> {
        let cap = self.config.max_items_per_record;
        let mut episodes = Vec::new();
        let mut page = 1;

        loop {
            let result = self.request(|api| api.episodes(mal_id, page))?;
            let more = result.has_more_after(page);
            let before = episodes.len();
            episodes.extend(result.episodes.into_iter().filter_map(merge::to_episode));
            // A page with nothing usable ends paging, whatever the source claims
            if episodes.len() == before || episodes.len() >= cap || !more {
                break;
            }
            page += 1;
        }

        if episodes.is_empty() {
            return Err(RecordError::NoData);
        }
        Ok(merge::merge_episode_guide(record, episodes, cap))
    }

    fn enrich_music(&self, record: &mut CatalogRecord, mal_id: u64) -> Result<bool, RecordError> {
        let themes = merge::to_music_themes(self.request(|api| api.themes(mal_id))?);
        if themes.is_empty() {
            return Err(RecordError::NoData);
        }
        Ok(merge::merge_music(
            record,
            themes,
            self.config.max_items_per_record,
        ))
    }

    fn enrich_relations(&self, record: &mut CatalogRecord, mal_id: u64) -> Result<bool, RecordError> {
        let cap = self.config.max_items_per_record;
        let groups = self.request(|api| api.relations(mal_id))?;

        let mut seen = HashSet::from([mal_id]);
        let related: Vec<_> = groups
            .into_iter()
            .flat_map(|group| {
                let relation = group.relation;
                group
                    .entry
                    .into_iter()
                    .map(move |entry| (relation.clone(), entry))
            })
            .filter(|(_, entry)| entry.is_anime() && seen.insert(entry.mal_id))
            .take(cap)
            .collect();

        if related.is_empty() {
            return Err(RecordError::NoData);
        }

        let mut seasons = Vec::with_capacity(related.len());
        for (relation, entry) in related {
            // A missing cover or year is not worth failing the record over
            let detail = match self.request(|api| api.anime(entry.mal_id)) {
                Ok(detail) => detail,
                Err(e) => {
                    warn!(
                        "Could not load related entry {} of \"{}\": {}",
                        entry.mal_id, record.title, e
                    );
                    None
                }
            };
            seasons.push(RelatedEntry {
                id: entry.mal_id.to_string(),
                title: entry.name,
                cover_image: detail
                    .as_ref()
                    .and_then(|d| d.image_url().or_else(|| d.large_image_url()))
                    .map(str::to_string),
                year: detail.as_ref().and_then(AnimeSummary::release_year),
                relation_type: relation,
            });
        }

        Ok(merge::merge_seasons(record, seasons, cap))
    }

    /// One logical API request: rate limited, retried per policy.
    fn request<T>(
        &self,
        mut call: impl FnMut(&A) -> Result<T, ApiError>,
    ) -> Result<T, RetryExhausted> {
        retry_with_backoff(&self.retry_policy, |_attempt| {
            self.limiter.wait();
            call(&self.api)
        })
    }

    fn is_checkpoint(&self, processed: usize, total: usize) -> bool {
        let every = self.config.max_records_per_checkpoint;
        // The final save covers the last record
        every > 0 && processed % every == 0 && processed < total
    }

    fn save(&self, records: &[CatalogRecord], phase: SavePhase) -> Result<(), PipelineError> {
        if self.config.dry_run {
            debug!("Dry run, not writing catalog ({:?})", phase);
            return Ok(());
        }

        self.store.save(records, phase).map_err(|source| match phase {
            SavePhase::Checkpoint { processed } => {
                PipelineError::CheckpointWrite { processed, source }
            }
            SavePhase::Final => PipelineError::FinalWrite(source),
        })?;

        if let SavePhase::Checkpoint { processed } = phase {
            self.progress
                .suspend(|| info!("Checkpoint: catalog saved after {} records", processed));
        }
        Ok(())
    }

    fn report(&self, index: usize, total: usize, record: &CatalogRecord, outcome: &RecordOutcome) {
        self.progress.suspend(|| {
            info!(
                "[{}/{}] {} {}",
                index + 1,
                total,
                outcome.label(),
                record.title
            );
            match outcome {
                RecordOutcome::Failed { mal_id, error } => warn!(
                    "Failed to enrich \"{}\" (id {}, mal_id {:?}): {}",
                    record.title, record.id, mal_id, error
                ),
                RecordOutcome::Skipped(reason) => debug!("Skipped \"{}\": {}", record.title, reason),
                RecordOutcome::Updated { .. } => {}
            }
        });
        self.progress.inc(1);
    }
}
