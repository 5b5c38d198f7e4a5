//! The orchestrator: one run, start to finish.
//!
//! Sequences schema initialisation, watermark lookup, window computation,
//! fetch, normalization, the transactional save, and the post-commit CSV
//! export. Every stage transition is logged under a per-run span; any error
//! unwinds to the binary, which reports it and exits non-zero.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use garner_core::{
  date::DateWindow, record::SaveSummary, report::ReportSource,
  store::MetricStore,
};
use garner_normalize::normalize_reports;
use garner_source::ReportFetcher;
use tracing::{Instrument as _, info, info_span, warn};
use uuid::Uuid;

use crate::export;

// ─── Stages ──────────────────────────────────────────────────────────────────

/// Pipeline progression, logged at every transition. The failure state is
/// reached by propagation: any error unwinds to the binary, which logs it
/// with context and exits 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Init,
  SchemaReady,
  WindowComputed,
  Skip,
  Fetched,
  Normalized,
  Saved,
  Done,
}

impl Stage {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Init => "init",
      Self::SchemaReady => "schema_ready",
      Self::WindowComputed => "window_computed",
      Self::Skip => "skip",
      Self::Fetched => "fetched",
      Self::Normalized => "normalized",
      Self::Saved => "saved",
      Self::Done => "done",
    }
  }
}

fn transition(stage: Stage) {
  info!(stage = stage.as_str(), "pipeline stage");
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// How a successful run ended. All three variants exit 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
  /// The watermark already covers today; nothing was fetched or written.
  UpToDate,
  /// The window was fetched but every category came back empty.
  Empty { window: DateWindow },
  Saved { window: DateWindow, summary: SaveSummary },
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

pub struct Pipeline<M, S> {
  store:               M,
  fetcher:             ReportFetcher<S>,
  export_dir:          PathBuf,
  initial_window_days: u64,
}

impl<M: MetricStore, S: ReportSource> Pipeline<M, S> {
  pub fn new(
    store: M,
    fetcher: ReportFetcher<S>,
    export_dir: impl Into<PathBuf>,
    initial_window_days: u64,
  ) -> Self {
    Self {
      store,
      fetcher,
      export_dir: export_dir.into(),
      initial_window_days,
    }
  }

  /// Run the pipeline once for the given current date.
  pub async fn run(&self, today: NaiveDate) -> Result<RunOutcome> {
    let run_id = Uuid::new_v4();
    let span = info_span!("pipeline_run", %run_id, %today);
    self.run_inner(today).instrument(span).await
  }

  async fn run_inner(&self, today: NaiveDate) -> Result<RunOutcome> {
    transition(Stage::Init);
    self
      .store
      .ensure_schema()
      .await
      .context("initialising schema")?;
    transition(Stage::SchemaReady);

    let last = match self.store.last_ingested_date().await {
      Ok(last) => last,
      // Soft degradation: an unreadable watermark means "fetch the initial
      // window". Only this log line distinguishes it from an empty
      // dimension.
      Err(err) => {
        warn!(error = %err, "watermark lookup failed; assuming no prior ingests");
        None
      }
    };

    let window = DateWindow::compute(last, today, self.initial_window_days);
    transition(Stage::WindowComputed);

    let Some(window) = window else {
      transition(Stage::Skip);
      info!(last_ingested = ?last, "no new data to fetch");
      transition(Stage::Done);
      return Ok(RunOutcome::UpToDate);
    };

    info!(%window, "fetching reports");
    let raw = self
      .fetcher
      .fetch(window)
      .await
      .context("fetching reports")?;
    transition(Stage::Fetched);

    let batch = normalize_reports(&raw).context("normalizing reports")?;
    transition(Stage::Normalized);

    if batch.is_empty() {
      info!(%window, "source returned no rows");
      transition(Stage::Done);
      return Ok(RunOutcome::Empty { window });
    }

    let summary = self.store.save(&batch).await.context("saving batch")?;
    transition(Stage::Saved);
    info!(
      dates = summary.dates,
      engagement_rows = summary.engagement_rows,
      content_rows = summary.content_rows,
      site_search_rows = summary.site_search_rows,
      "batch committed"
    );

    // Snapshots come strictly after the commit; a failure here fails the
    // run but the committed data stands.
    export::write_snapshots(&self.export_dir, &batch)
      .context("exporting snapshots")?;

    transition(Stage::Done);
    Ok(RunOutcome::Saved { window, summary })
  }
}
