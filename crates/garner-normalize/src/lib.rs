//! Normalizer for raw reporting-API rows.
//!
//! Converts the ordered string rows of the remote source into
//! [`garner_core`] record types: compact dates become calendar dates, counts
//! become integers, rates and durations become floats. Pure synchronous; no
//! HTTP or database dependencies.
//!
//! No deduplication or aggregation happens here. The source contract says at
//! most one row per (date) or (date, secondary-dimension) key per query;
//! repeated keys are kept verbatim and surfaced with a WARN log.

pub mod error;
mod parse;

pub use error::{Error, Result};

use garner_core::{
  record::{ContentRecord, EngagementRecord, ReportBatch, SiteSearchRecord},
  report::{RawReports, ReportRow},
};

/// Normalize engagement rows: `date` / users, sessions, engagement rate,
/// conversions, average session duration.
pub fn normalize_engagement(rows: &[ReportRow]) -> Result<Vec<EngagementRecord>> {
  parse::engagement(rows)
}

/// Normalize content rows: `date`, `pageTitle` / page views, sessions,
/// engagement rate, session duration.
pub fn normalize_content(rows: &[ReportRow]) -> Result<Vec<ContentRecord>> {
  parse::content(rows)
}

/// Normalize site-search rows: `date`, `searchTerm` / clicks, impressions.
pub fn normalize_site_search(rows: &[ReportRow]) -> Result<Vec<SiteSearchRecord>> {
  parse::site_search(rows)
}

/// Normalize a whole fetch result into the batch the writer persists.
pub fn normalize_reports(raw: &RawReports) -> Result<ReportBatch> {
  Ok(ReportBatch {
    engagement:  parse::engagement(&raw.engagement)?,
    content:     parse::content(&raw.content)?,
    site_search: parse::site_search(&raw.site_search)?,
  })
}
