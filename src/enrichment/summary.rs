use super::error::RecordError;
use super::EnrichmentKind;
use crate::catalog::CatalogRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Terminal state of one record.
#[derive(Debug)]
pub enum RecordOutcome {
    Updated { mal_id: u64 },
    Skipped(&'static str),
    Failed {
        mal_id: Option<u64>,
        error: RecordError,
    },
}

impl RecordOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RecordOutcome::Updated { .. } => "updated",
            RecordOutcome::Skipped(_) => "skipped",
            RecordOutcome::Failed { .. } => "failed",
        }
    }
}

/// A record that could not be enriched, with enough context to retry it by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRecord {
    pub id: String,
    pub title: String,
    pub mal_id: Option<u64>,
    pub reason: String,
}

/// Counters of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
    pub failures: Vec<FailedRecord>,
}

impl Summary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record(&mut self, record: &CatalogRecord, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Updated { .. } => self.updated += 1,
            RecordOutcome::Skipped(_) => self.skipped += 1,
            RecordOutcome::Failed { mal_id, error } => {
                self.failed += 1;
                self.failures.push(FailedRecord {
                    id: record.id.clone(),
                    title: record.title.clone(),
                    mal_id: *mal_id,
                    reason: error.to_string(),
                });
            }
        }
    }

    pub fn processed(&self) -> usize {
        self.updated + self.skipped + self.failed
    }

    /// Prints the final summary block.
    pub fn log(&self, output: &Path) {
        info!("========================================");
        info!("Enrichment complete");
        info!("  Updated: {}", self.updated);
        info!("  Skipped: {}", self.skipped);
        info!("  Failed:  {}", self.failed);
        info!("  Total:   {}", self.total);
        info!("  Output:  {}", output.display());
        info!("========================================");
    }
}

/// JSON report of a run, written on request for later follow-up.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub kind: EnrichmentKind,
    pub catalog_path: PathBuf,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: Summary,
}

impl RunReport {
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run report: {:?}", path))
    }
}
