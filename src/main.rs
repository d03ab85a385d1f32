use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
// Import modules from the library crate
use anime_catalog_enricher::catalog::JsonCatalogStore;
use anime_catalog_enricher::config::{self, DEFAULT_USER_AGENT};
use anime_catalog_enricher::enrichment::{EnrichmentKind, EnrichmentPipeline, RunReport};
use anime_catalog_enricher::jikan::{JikanClient, DEFAULT_BASE_URL};
use anime_catalog_enricher::progress::{create_progress_bar, format_duration};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[clap(version, about = "Enrich a JSON anime catalog from a Jikan-compatible API")]
struct CliArgs {
    /// Path to the JSON catalog file. It is rewritten in place.
    #[clap(value_parser = parse_path)]
    pub catalog: PathBuf,

    /// What to enrich.
    #[clap(short, long, default_value = "metadata")]
    pub kind: EnrichmentKind,

    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Minimum delay between two API requests, in milliseconds.
    #[clap(long, default_value_t = 400)]
    pub request_interval_ms: u64,

    /// Retries after the first attempt of a failed request.
    #[clap(long, default_value_t = 3)]
    pub max_retries: u32,

    /// Base retry delay in milliseconds. Multiplied by the attempt number on HTTP 429.
    #[clap(long, default_value_t = 2000)]
    pub retry_backoff_ms: u64,

    /// Save the catalog every N processed records. Set to 0 to only save at the end.
    #[clap(long, default_value_t = 10)]
    pub checkpoint_every: usize,

    /// Maximum number of items stored in any list field of a record.
    #[clap(long, default_value_t = 100)]
    pub max_items: usize,

    /// Run the whole pipeline but never write the catalog.
    #[clap(long)]
    pub dry_run: bool,

    /// Only process the first N records.
    #[clap(long)]
    pub limit: Option<usize>,

    /// Base URL of the metadata API.
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// User-Agent header sent to the metadata API.
    #[clap(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Timeout in seconds for a single API request.
    #[clap(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Write a JSON report of the run (including failed records) to this path.
    #[clap(long, value_parser = parse_path)]
    pub report: Option<PathBuf>,

    /// Hide the progress bar and only print log lines.
    #[clap(long)]
    pub log_only: bool,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            catalog_path: args.catalog.clone(),
            kind: args.kind,
            request_interval_ms: args.request_interval_ms,
            max_retries: args.max_retries,
            retry_backoff_ms: args.retry_backoff_ms,
            max_records_per_checkpoint: args.checkpoint_every,
            max_items_per_record: args.max_items,
            dry_run: args.dry_run,
            limit: args.limit,
            base_url: args.base_url.clone(),
            user_agent: args.user_agent.clone(),
            request_timeout_secs: args.request_timeout_secs,
            report_path: args.report.clone(),
            log_only: args.log_only,
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Catalog: {:?}", app_config.catalog_path);
    info!("Kind: {}", app_config.kind);
    info!("API: {}", app_config.pipeline.api.base_url);

    let api = JikanClient::new(
        &app_config.pipeline.api.base_url,
        &app_config.pipeline.api.user_agent,
        app_config.pipeline.api.request_timeout(),
    )
    .context("Failed to create metadata API client")?;
    let store = JsonCatalogStore::new(&app_config.catalog_path);
    let progress = create_progress_bar(
        0,
        &format!("Enriching {}", app_config.kind),
        app_config.log_only,
    );
    let pipeline =
        EnrichmentPipeline::new(api, store, app_config.pipeline.clone()).with_progress(progress);

    let started_at = Utc::now();
    let timer = Instant::now();
    let summary = match pipeline.run(app_config.kind) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Enrichment aborted: {}", e);
            return Err(e.into());
        }
    };
    let finished_at = Utc::now();

    summary.log(&app_config.catalog_path);
    info!(
        "Took {} ({} requests)",
        format_duration(timer.elapsed()),
        pipeline.requests_issued()
    );

    if let Some(report_path) = &app_config.report_path {
        let report = RunReport {
            kind: app_config.kind,
            catalog_path: app_config.catalog_path.clone(),
            dry_run: app_config.pipeline.dry_run,
            started_at,
            finished_at,
            summary,
        };
        report.write(report_path)?;
        info!("Run report written to {:?}", report_path);
    }

    Ok(())
}
