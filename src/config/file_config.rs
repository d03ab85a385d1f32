use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Optional TOML configuration file.
///
/// ```toml
/// report_path = "enrichment-report.json"
///
/// [pipeline]
/// request_interval_ms = 400
/// max_retries = 3
///
/// [api]
/// base_url = "https://api.jikan.moe/v4"
/// ```
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub report_path: Option<String>,
    pub log_only: Option<bool>,

    pub pipeline: Option<PipelineFileConfig>,
    pub api: Option<ApiFileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PipelineFileConfig {
    pub request_interval_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub max_records_per_checkpoint: Option<usize>,
    pub max_items_per_record: Option<usize>,
    pub dry_run: Option<bool>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ApiFileConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
