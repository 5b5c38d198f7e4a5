//! Position-based row decoding per category.
//!
//! Dimension value 0 is always the compact-encoded date; further dimension
//! values and all metric values are addressed by position, matching the
//! fixed request catalog in `garner-source`. Malformed values are hard
//! errors — a bad row is never silently dropped.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use garner_core::{
  date,
  record::{ContentRecord, EngagementRecord, SiteSearchRecord},
  report::{Category, ReportRow},
};
use tracing::warn;

use crate::{Error, Result};

// ─── Field access ────────────────────────────────────────────────────────────

/// Positional accessor over one raw row, carrying the category for error
/// reporting.
struct RowFields<'a> {
  category: Category,
  row:      &'a ReportRow,
}

impl<'a> RowFields<'a> {
  fn new(category: Category, row: &'a ReportRow) -> Self {
    Self { category, row }
  }

  fn dimension(&self, index: usize) -> Result<&'a str> {
    self
      .row
      .dimension_values
      .get(index)
      .map(String::as_str)
      .ok_or(Error::MissingDimension { category: self.category, index })
  }

  fn metric(&self, index: usize, field: &'static str) -> Result<&'a str> {
    self
      .row
      .metric_values
      .get(index)
      .map(String::as_str)
      .ok_or(Error::MissingMetric { category: self.category, index, field })
  }

  fn date(&self) -> Result<NaiveDate> {
    let raw = self.dimension(0)?;
    date::from_compact(raw).map_err(|_| Error::InvalidDate {
      category: self.category,
      value:    raw.to_string(),
    })
  }

  fn int(&self, index: usize, field: &'static str) -> Result<i64> {
    let raw = self.metric(index, field)?;
    raw.trim().parse().map_err(|_| Error::InvalidNumber {
      category: self.category,
      field,
      value: raw.to_string(),
    })
  }

  fn float(&self, index: usize, field: &'static str) -> Result<f64> {
    let raw = self.metric(index, field)?;
    raw.trim().parse().map_err(|_| Error::InvalidNumber {
      category: self.category,
      field,
      value: raw.to_string(),
    })
  }
}

/// Surface repeated (date[, secondary]) keys without dropping or merging
/// anything; the source contract promises at most one row per key, so
/// repetition is an anomaly worth a log line.
fn warn_on_repeated_keys<K: Ord>(
  category: Category,
  keys: impl IntoIterator<Item = K>,
) {
  let mut counts: BTreeMap<K, usize> = BTreeMap::new();
  for key in keys {
    *counts.entry(key).or_default() += 1;
  }
  let repeated: usize = counts.values().filter(|&&n| n > 1).map(|n| n - 1).sum();
  if repeated > 0 {
    warn!(
      category = %category,
      repeated_rows = repeated,
      "source returned repeated keys within one query; keeping all rows"
    );
  }
}

// ─── Per-category decoders ───────────────────────────────────────────────────

pub fn engagement(rows: &[ReportRow]) -> Result<Vec<EngagementRecord>> {
  let records = rows
    .iter()
    .map(|row| {
      let f = RowFields::new(Category::Engagement, row);
      Ok(EngagementRecord {
        date:                     f.date()?,
        users:                    f.int(0, "users")?,
        sessions:                 f.int(1, "sessions")?,
        engagement_rate:          f.float(2, "engagement_rate")?,
        conversions:              f.int(3, "conversions")?,
        average_session_duration: f.float(4, "average_session_duration")?,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  warn_on_repeated_keys(Category::Engagement, records.iter().map(|r| r.date));
  Ok(records)
}

pub fn content(rows: &[ReportRow]) -> Result<Vec<ContentRecord>> {
  let records = rows
    .iter()
    .map(|row| {
      let f = RowFields::new(Category::Content, row);
      Ok(ContentRecord {
        date:             f.date()?,
        // Verbatim, including the empty/placeholder titles the source
        // returns for untitled pages.
        page_title:       f.dimension(1)?.to_string(),
        page_views:       f.int(0, "page_views")?,
        sessions:         f.int(1, "sessions")?,
        engagement_rate:  f.float(2, "engagement_rate")?,
        session_duration: f.float(3, "session_duration")?,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  warn_on_repeated_keys(
    Category::Content,
    records.iter().map(|r| (r.date, r.page_title.clone())),
  );
  Ok(records)
}

pub fn site_search(rows: &[ReportRow]) -> Result<Vec<SiteSearchRecord>> {
  let records = rows
    .iter()
    .map(|row| {
      let f = RowFields::new(Category::SiteSearch, row);
      Ok(SiteSearchRecord {
        date:        f.date()?,
        search_term: f.dimension(1)?.to_string(),
        clicks:      f.int(0, "clicks")?,
        impressions: f.int(1, "impressions")?,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  warn_on_repeated_keys(
    Category::SiteSearch,
    records.iter().map(|r| (r.date, r.search_term.clone())),
  );
  Ok(records)
}
