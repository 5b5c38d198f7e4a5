//! Normalized per-category record types and the batch the writer persists.
//!
//! Records are the output of `garner-normalize` and the input to the
//! relational writer; they carry typed values but no surrogate identifiers.
//! Identifier resolution happens inside the store, at save time.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Records ─────────────────────────────────────────────────────────────────

/// Per-date engagement aggregate — one logical row per date per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
  pub date:                     NaiveDate,
  pub users:                    i64,
  pub sessions:                 i64,
  /// Preserved exactly as the source reports it (0–1 or 0–100 convention).
  pub engagement_rate:          f64,
  pub conversions:              i64,
  /// Seconds.
  pub average_session_duration: f64,
}

/// Per-(date, page title) content metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
  pub date:             NaiveDate,
  /// Verbatim from the source, including empty/placeholder titles.
  pub page_title:       String,
  pub page_views:       i64,
  pub sessions:         i64,
  pub engagement_rate:  f64,
  pub session_duration: f64,
}

/// Per-(date, search term) site-search metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSearchRecord {
  pub date:        NaiveDate,
  pub search_term: String,
  /// Event-count proxy.
  pub clicks:      i64,
  /// Page-view proxy.
  pub impressions: i64,
}

// ─── Batch ───────────────────────────────────────────────────────────────────

/// All normalized records from one fetch window, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportBatch {
  pub engagement:  Vec<EngagementRecord>,
  pub content:     Vec<ContentRecord>,
  pub site_search: Vec<SiteSearchRecord>,
}

impl ReportBatch {
  pub fn is_empty(&self) -> bool {
    self.engagement.is_empty()
      && self.content.is_empty()
      && self.site_search.is_empty()
  }

  /// Distinct calendar dates appearing anywhere in the batch, ordered.
  pub fn distinct_dates(&self) -> BTreeSet<NaiveDate> {
    let mut dates = BTreeSet::new();
    dates.extend(self.engagement.iter().map(|r| r.date));
    dates.extend(self.content.iter().map(|r| r.date));
    dates.extend(self.site_search.iter().map(|r| r.date));
    dates
  }
}

// ─── Save summary ────────────────────────────────────────────────────────────

/// Row counts from one successful save, for logging and run summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
  /// Distinct dates the batch touched (resolved, not necessarily created).
  pub dates:            usize,
  pub engagement_rows:  usize,
  pub content_rows:     usize,
  pub site_search_rows: usize,
}
