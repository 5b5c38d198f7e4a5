//! Raw report rows and the reporting-source seam.
//!
//! The remote reporting API is consumed as a black box: a function from a
//! report request to ordered string rows. The production HTTP binding lives
//! in `garner-source`; tests substitute fixtures.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::date::DateWindow;

// ─── Categories ──────────────────────────────────────────────────────────────

/// The three fixed metric categories every run fetches.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Engagement,
  Content,
  SiteSearch,
}

impl Category {
  pub const ALL: [Self; 3] = [Self::Engagement, Self::Content, Self::SiteSearch];

  /// Stable name used in logs and export file names.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Engagement => "engagement",
      Self::Content => "content",
      Self::SiteSearch => "site_search",
    }
  }
}

impl std::fmt::Display for Category {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// One raw row from the reporting source: ordered dimension values followed
/// by ordered metric values, all strings. The first dimension value is
/// always the compact-encoded date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
  pub dimension_values: Vec<String>,
  pub metric_values:    Vec<String>,
}

/// The raw result of one fetch: rows per category over the same window.
#[derive(Debug, Clone, Default)]
pub struct RawReports {
  pub engagement:  Vec<ReportRow>,
  pub content:     Vec<ReportRow>,
  pub site_search: Vec<ReportRow>,
}

impl RawReports {
  pub fn is_empty(&self) -> bool {
    self.engagement.is_empty()
      && self.content.is_empty()
      && self.site_search.is_empty()
  }

  pub fn rows(&self, category: Category) -> &[ReportRow] {
    match category {
      Category::Engagement => &self.engagement,
      Category::Content => &self.content,
      Category::SiteSearch => &self.site_search,
    }
  }
}

// ─── Source seam ─────────────────────────────────────────────────────────────

/// One report query: a closed date window plus ordered dimension and metric
/// names, issued against a single property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
  pub property_id: String,
  pub window:      DateWindow,
  pub dimensions:  Vec<String>,
  pub metrics:     Vec<String>,
}

/// Marks source errors the retrying fetcher may treat as worth another
/// attempt (timeouts, connection resets, rate limiting, server errors).
pub trait Transient {
  fn is_transient(&self) -> bool;
}

/// Abstraction over the remote reporting API.
pub trait ReportSource: Send + Sync {
  type Error: std::error::Error + Transient + Send + Sync + 'static;

  /// Run one report query and return its raw rows.
  fn run_report<'a>(
    &'a self,
    request: &'a ReportRequest,
  ) -> impl Future<Output = Result<Vec<ReportRow>, Self::Error>> + Send + 'a;
}
