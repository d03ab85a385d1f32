mod file_config;

pub use file_config::{ApiFileConfig, FileConfig, PipelineFileConfig};

use crate::enrichment::EnrichmentKind;
use crate::jikan::DEFAULT_BASE_URL;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("anime-catalog-enricher/", env!("CARGO_PKG_VERSION"));

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub catalog_path: PathBuf,
    pub kind: EnrichmentKind,
    pub request_interval_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub max_records_per_checkpoint: usize,
    pub max_items_per_record: usize,
    pub dry_run: bool,
    pub limit: Option<usize>,
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub report_path: Option<PathBuf>,
    pub log_only: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        Self {
            catalog_path: PathBuf::new(),
            kind: EnrichmentKind::Metadata,
            request_interval_ms: pipeline.request_interval_ms,
            max_retries: pipeline.max_retries,
            retry_backoff_ms: pipeline.retry_backoff_ms,
            max_records_per_checkpoint: pipeline.max_records_per_checkpoint,
            max_items_per_record: pipeline.max_items_per_record,
            dry_run: false,
            limit: None,
            base_url: pipeline.api.base_url,
            user_agent: pipeline.api.user_agent,
            request_timeout_secs: pipeline.api.request_timeout_secs,
            report_path: None,
            log_only: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub kind: EnrichmentKind,
    pub pipeline: PipelineConfig,
    pub report_path: Option<PathBuf>,
    pub log_only: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let pipeline_file = file.pipeline.unwrap_or_default();
        let api_file = file.api.unwrap_or_default();

        let api = ApiSettings {
            base_url: api_file.base_url.unwrap_or_else(|| cli.base_url.clone()),
            user_agent: api_file
                .user_agent
                .unwrap_or_else(|| cli.user_agent.clone()),
            request_timeout_secs: api_file
                .request_timeout_secs
                .unwrap_or(cli.request_timeout_secs),
        };

        if api.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        if api.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }

        let pipeline = PipelineConfig {
            request_interval_ms: pipeline_file
                .request_interval_ms
                .unwrap_or(cli.request_interval_ms),
            max_retries: pipeline_file.max_retries.unwrap_or(cli.max_retries),
            retry_backoff_ms: pipeline_file
                .retry_backoff_ms
                .unwrap_or(cli.retry_backoff_ms),
            max_records_per_checkpoint: pipeline_file
                .max_records_per_checkpoint
                .unwrap_or(cli.max_records_per_checkpoint),
            max_items_per_record: pipeline_file
                .max_items_per_record
                .unwrap_or(cli.max_items_per_record),
            // Either source can turn dry run on
            dry_run: pipeline_file.dry_run.unwrap_or(false) || cli.dry_run,
            limit: pipeline_file.limit.or(cli.limit),
            api,
        };

        if pipeline.max_items_per_record == 0 {
            bail!("max_items_per_record must be greater than zero");
        }

        let report_path = file
            .report_path
            .map(PathBuf::from)
            .or_else(|| cli.report_path.clone());
        let log_only = file.log_only.unwrap_or(cli.log_only);

        Ok(Self {
            catalog_path: cli.catalog_path.clone(),
            kind: cli.kind,
            pipeline,
            report_path,
            log_only,
        })
    }
}

/// Settings of one enrichment run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Fixed delay between two consecutive API requests
    pub request_interval_ms: u64,
    /// Retries after the first attempt of a request
    pub max_retries: u32,
    /// Base retry delay; multiplied by the attempt number for HTTP 429
    pub retry_backoff_ms: u64,
    /// Records processed between two catalog writes; 0 disables checkpoints
    pub max_records_per_checkpoint: usize,
    /// Cap for every list-valued field written to a record
    pub max_items_per_record: usize,
    /// Never write the catalog file
    pub dry_run: bool,
    /// Only process the first `limit` records
    pub limit: Option<usize>,
    pub api: ApiSettings,
}

impl PipelineConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_interval_ms: 400, // ~2.5 req/sec
            max_retries: 3,
            retry_backoff_ms: 2000,
            max_records_per_checkpoint: 10,
            max_items_per_record: 100,
            dry_run: false,
            limit: None,
            api: ApiSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
        }
    }
}
