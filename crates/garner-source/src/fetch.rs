//! The retrying report fetcher and the per-category request catalog.

use std::time::Duration;

use garner_core::{
  date::DateWindow,
  report::{Category, RawReports, ReportRequest, ReportSource, Transient},
};
use tracing::warn;

// ─── Backoff ─────────────────────────────────────────────────────────────────

/// Bounded exponential backoff: `base * 2^attempt`, capped.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
  /// Total attempts, first try included.
  pub max_attempts: usize,
  pub base_delay:   Duration,
  pub max_delay:    Duration,
}

impl Default for BackoffPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      base_delay:   Duration::from_secs(2),
      max_delay:    Duration::from_secs(10),
    }
  }
}

impl BackoffPolicy {
  pub fn delay_for_attempt(&self, attempt_index: usize) -> Duration {
    let factor = 1u32.checked_shl(attempt_index as u32).unwrap_or(u32::MAX);
    let delay = self.base_delay.saturating_mul(factor);
    delay.min(self.max_delay)
  }
}

// ─── Request catalog ─────────────────────────────────────────────────────────

/// The fixed query each category issues over a window.
pub fn request_for(
  category: Category,
  property_id: &str,
  window: DateWindow,
) -> ReportRequest {
  let (dimensions, metrics): (&[&str], &[&str]) = match category {
    Category::Engagement => (&["date"], &[
      "activeUsers",
      "sessions",
      "engagementRate",
      "conversions",
      "averageSessionDuration",
    ]),
    Category::Content => (&["date", "pageTitle"], &[
      "screenPageViews",
      "sessions",
      "engagementRate",
      "userEngagementDuration",
    ]),
    Category::SiteSearch => {
      (&["date", "searchTerm"], &["eventCount", "screenPageViews"])
    }
  };

  ReportRequest {
    property_id: property_id.to_string(),
    window,
    dimensions: dimensions.iter().map(|s| s.to_string()).collect(),
    metrics: metrics.iter().map(|s| s.to_string()).collect(),
  }
}

// ─── Fetcher ─────────────────────────────────────────────────────────────────

/// Issues all three category queries over one window, retrying the whole
/// fetch as a unit on transient failures. A failure in any category query
/// forces a replay of all three — partial results never escape.
pub struct ReportFetcher<S> {
  source:      S,
  property_id: String,
  backoff:     BackoffPolicy,
}

impl<S: ReportSource> ReportFetcher<S> {
  pub fn new(source: S, property_id: impl Into<String>) -> Self {
    Self {
      source,
      property_id: property_id.into(),
      backoff: BackoffPolicy::default(),
    }
  }

  /// Override the retry schedule (tests use zero delays).
  pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
    self.backoff = backoff;
    self
  }

  pub async fn fetch(&self, window: DateWindow) -> Result<RawReports, S::Error> {
    let mut attempt = 0;
    loop {
      match self.fetch_once(window).await {
        Ok(reports) => return Ok(reports),
        Err(err)
          if err.is_transient() && attempt + 1 < self.backoff.max_attempts =>
        {
          let delay = self.backoff.delay_for_attempt(attempt);
          warn!(
            attempt = attempt + 1,
            max_attempts = self.backoff.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "transient fetch failure; backing off"
          );
          tokio::time::sleep(delay).await;
          attempt += 1;
        }
        Err(err) => return Err(err),
      }
    }
  }

  async fn fetch_once(&self, window: DateWindow) -> Result<RawReports, S::Error> {
    let mut reports = RawReports::default();
    for category in Category::ALL {
      let request = request_for(category, &self.property_id, window);
      let rows = self.source.run_report(&request).await?;
      match category {
        Category::Engagement => reports.engagement = rows,
        Category::Content => reports.content = rows,
        Category::SiteSearch => reports.site_search = rows,
      }
    }
    Ok(reports)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use chrono::NaiveDate;
  use garner_core::report::ReportRow;

  use super::*;
  use crate::Error;

  fn window() -> DateWindow {
    let d = |s: &str| s.parse::<NaiveDate>().unwrap();
    DateWindow { start: d("2024-01-01"), end: d("2024-01-31") }
  }

  fn no_delay() -> BackoffPolicy {
    BackoffPolicy {
      max_attempts: 3,
      base_delay:   Duration::ZERO,
      max_delay:    Duration::ZERO,
    }
  }

  /// Fails the first `failures` calls with the given status, then returns
  /// one empty row per request.
  struct FlakySource {
    failures: usize,
    status:   u16,
    calls:    AtomicUsize,
  }

  impl FlakySource {
    fn new(failures: usize, status: u16) -> Self {
      Self { failures, status, calls: AtomicUsize::new(0) }
    }
  }

  impl ReportSource for FlakySource {
    type Error = Error;

    async fn run_report(
      &self,
      _request: &ReportRequest,
    ) -> Result<Vec<ReportRow>, Error> {
      let call = self.calls.fetch_add(1, Ordering::SeqCst);
      if call < self.failures {
        return Err(Error::Status {
          status: self.status,
          url:    "test://report".into(),
        });
      }
      Ok(vec![ReportRow::default()])
    }
  }

  // ── Backoff schedule ──────────────────────────────────────────────────────

  #[test]
  fn backoff_doubles_from_two_seconds_and_caps_at_ten() {
    let policy = BackoffPolicy::default();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(2));
    assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(4));
    assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(8));
    assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(10));
    assert_eq!(policy.delay_for_attempt(9), Duration::from_secs(10));
  }

  // ── Request catalog ───────────────────────────────────────────────────────

  #[test]
  fn every_category_queries_date_first() {
    for category in Category::ALL {
      let request = request_for(category, "prop", window());
      assert_eq!(request.dimensions[0], "date");
      assert_eq!(request.property_id, "prop");
      assert_eq!(request.window, window());
    }
  }

  #[test]
  fn engagement_catalog_matches_the_schema_fields() {
    let request = request_for(Category::Engagement, "prop", window());
    assert_eq!(request.dimensions, vec!["date"]);
    assert_eq!(request.metrics, vec![
      "activeUsers",
      "sessions",
      "engagementRate",
      "conversions",
      "averageSessionDuration",
    ]);
  }

  // ── Retry behavior ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn exhausting_retries_surfaces_the_error() {
    let source = FlakySource::new(usize::MAX, 503);
    let fetcher =
      ReportFetcher::new(source, "prop").with_backoff(no_delay());

    let err = fetcher.fetch(window()).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 503, .. }));
    // Each attempt dies on its first category query: 3 attempts, 3 calls.
    assert_eq!(fetcher.source.calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn transient_failures_replay_the_whole_fetch() {
    let source = FlakySource::new(2, 429);
    let fetcher =
      ReportFetcher::new(source, "prop").with_backoff(no_delay());

    let reports = fetcher.fetch(window()).await.unwrap();
    assert_eq!(reports.engagement.len(), 1);
    assert_eq!(reports.content.len(), 1);
    assert_eq!(reports.site_search.len(), 1);
    // Two failed attempts (one call each) plus one full three-query pass.
    assert_eq!(fetcher.source.calls.load(Ordering::SeqCst), 5);
  }

  #[tokio::test]
  async fn non_transient_errors_abort_immediately() {
    let source = FlakySource::new(usize::MAX, 404);
    let fetcher =
      ReportFetcher::new(source, "prop").with_backoff(no_delay());

    let err = fetcher.fetch(window()).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 404, .. }));
    assert_eq!(fetcher.source.calls.load(Ordering::SeqCst), 1);
  }
}
