//! garner — scheduled batch ingestion of reporting metrics.
//!
//! Runs fully from configuration (no CLI arguments): reads `garner.toml`
//! and `GARNER_*` environment variables, pulls the incremental window from
//! the reporting API, commits it to the SQLite store, writes CSV snapshots,
//! and exits. Exit code 0 on success or no-op skip; 1 on any fatal failure.

use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;
use garner_pipeline::{JobConfig, Pipeline, RunOutcome};
use garner_source::{Credentials, HttpReportSource, ReportFetcher};
use garner_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

#[tokio::main]
async fn main() {
  let config = match JobConfig::load() {
    Ok(config) => config,
    Err(err) => {
      eprintln!("garner: {err:#}");
      std::process::exit(1);
    }
  };

  if let Err(err) = init_logging(&config) {
    eprintln!("garner: {err:#}");
    std::process::exit(1);
  }

  if let Err(err) = run(config).await {
    tracing::error!(stage = "failed", error = %format!("{err:#}"), "pipeline failed");
    std::process::exit(1);
  }
}

/// Console plus append-mode log file, both behind the env filter.
fn init_logging(config: &JobConfig) -> anyhow::Result<()> {
  let log_file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&config.log_path)
    .with_context(|| {
      format!("opening log file {}", config.log_path.display())
    })?;

  tracing_subscriber::registry()
    .with(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with(tracing_subscriber::fmt::layer())
    .with(
      tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file)),
    )
    .init();
  Ok(())
}

async fn run(config: JobConfig) -> anyhow::Result<()> {
  let credentials = Credentials::from_file(&config.credentials_path)
    .context("loading credentials")?;
  if let Some(account) = &credentials.account {
    tracing::info!(account, "loaded reporting credentials");
  }

  let store = SqliteStore::open(&config.database_path)
    .await
    .with_context(|| {
      format!("opening store at {}", config.database_path.display())
    })?;

  let source = HttpReportSource::new(config.api_base.as_str(), &credentials)
    .context("building report source")?;
  let fetcher = ReportFetcher::new(source, config.property_id.clone());

  let pipeline = Pipeline::new(
    store,
    fetcher,
    config.export_dir.clone(),
    config.initial_window_days,
  );

  match pipeline.run(Utc::now().date_naive()).await? {
    RunOutcome::UpToDate => tracing::info!("already up to date"),
    RunOutcome::Empty { window } => {
      tracing::info!(%window, "window fetched; no rows returned");
    }
    RunOutcome::Saved { window, summary } => tracing::info!(
      %window,
      dates = summary.dates,
      engagement_rows = summary.engagement_rows,
      content_rows = summary.content_rows,
      site_search_rows = summary.site_search_rows,
      "run complete"
    ),
  }
  Ok(())
}
