//! Post-commit CSV snapshots, one file per category.
//!
//! Written strictly after a successful save: a failed export fails the run
//! but cannot unwind the committed transaction. Each snapshot is a
//! whole-file overwrite containing the latest run's records exactly as
//! inserted, headers included.

use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use garner_core::{date, record::ReportBatch, report::Category};

/// Write the three snapshots into `dir`, returning the paths written.
pub fn write_snapshots(dir: &Path, batch: &ReportBatch) -> Result<Vec<PathBuf>> {
  fs::create_dir_all(dir)
    .with_context(|| format!("creating export dir {}", dir.display()))?;

  let mut written = Vec::with_capacity(Category::ALL.len());
  for category in Category::ALL {
    let path = dir.join(format!("{category}_metrics.csv"));
    let contents = match category {
      Category::Engagement => engagement_csv(batch),
      Category::Content => content_csv(batch),
      Category::SiteSearch => site_search_csv(batch),
    };
    fs::write(&path, contents)
      .with_context(|| format!("writing {}", path.display()))?;
    written.push(path);
  }
  Ok(written)
}

/// Quote a field when it contains a comma, quote, or line break (RFC 4180).
fn csv_field(raw: &str) -> String {
  if raw.contains(['"', ',', '\n', '\r']) {
    format!("\"{}\"", raw.replace('"', "\"\""))
  } else {
    raw.to_string()
  }
}

fn engagement_csv(batch: &ReportBatch) -> String {
  let mut out = String::from(
    "date,users,sessions,engagement_rate,conversions,average_session_duration\n",
  );
  for r in &batch.engagement {
    out.push_str(&format!(
      "{},{},{},{},{},{}\n",
      date::to_canonical(r.date),
      r.users,
      r.sessions,
      r.engagement_rate,
      r.conversions,
      r.average_session_duration,
    ));
  }
  out
}

fn content_csv(batch: &ReportBatch) -> String {
  let mut out = String::from(
    "date,page_title,page_views,sessions,engagement_rate,session_duration\n",
  );
  for r in &batch.content {
    out.push_str(&format!(
      "{},{},{},{},{},{}\n",
      date::to_canonical(r.date),
      csv_field(&r.page_title),
      r.page_views,
      r.sessions,
      r.engagement_rate,
      r.session_duration,
    ));
  }
  out
}

fn site_search_csv(batch: &ReportBatch) -> String {
  let mut out = String::from("date,search_term,clicks,impressions\n");
  for r in &batch.site_search {
    out.push_str(&format!(
      "{},{},{},{}\n",
      date::to_canonical(r.date),
      csv_field(&r.search_term),
      r.clicks,
      r.impressions,
    ));
  }
  out
}
