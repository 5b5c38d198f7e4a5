//! Calendar-date encodings and fetch-window arithmetic.
//!
//! Dates are canonical `YYYY-MM-DD` text wherever they are stored or
//! compared. The remote reporting source emits a compact 8-digit `YYYYMMDD`
//! form in its rows, and dimension rows written before the canonical
//! encoding was adopted still carry it — both decoders are permanent, not a
//! migration step.

use chrono::{Days, NaiveDate};

use crate::{Error, Result};

/// Canonical storage and interchange format.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Compact format used by the remote source and by legacy dimension rows.
pub const COMPACT_FORMAT: &str = "%Y%m%d";

// ─── Codecs ──────────────────────────────────────────────────────────────────

pub fn to_canonical(date: NaiveDate) -> String {
  date.format(CANONICAL_FORMAT).to_string()
}

/// Decode the remote source's 8-digit date. Exact and lossless: zero-padded
/// year/month/day, no timezone shift.
pub fn from_compact(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, COMPACT_FORMAT)
    .map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Decode a date read back from the dimension: canonical first, then the
/// legacy compact fallback.
pub fn from_stored(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, CANONICAL_FORMAT)
    .or_else(|_| NaiveDate::parse_from_str(s, COMPACT_FORMAT))
    .map_err(|_| Error::InvalidDate(s.to_string()))
}

// ─── Fetch window ────────────────────────────────────────────────────────────

/// A closed (inclusive at both ends) range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl DateWindow {
  /// The window the next run should fetch.
  ///
  /// Starts the day after `last_ingested`, or `initial_days` before `today`
  /// when nothing has been ingested yet; always ends at `today`. Returns
  /// `None` when the start would fall after `today` — the job has already
  /// covered today and there is nothing to fetch.
  pub fn compute(
    last_ingested: Option<NaiveDate>,
    today: NaiveDate,
    initial_days: u64,
  ) -> Option<Self> {
    let start = match last_ingested {
      Some(last) => last.checked_add_days(Days::new(1))?,
      None => today.checked_sub_days(Days::new(initial_days))?,
    };
    (start <= today).then_some(Self { start, end: today })
  }
}

impl std::fmt::Display for DateWindow {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}..={}", self.start, self.end)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, CANONICAL_FORMAT).unwrap()
  }

  // ── Codecs ────────────────────────────────────────────────────────────────

  #[test]
  fn compact_decodes_exactly() {
    assert_eq!(from_compact("20240315").unwrap(), d("2024-03-15"));
    assert_eq!(to_canonical(from_compact("20240315").unwrap()), "2024-03-15");
  }

  #[test]
  fn compact_rejects_malformed_input() {
    assert!(from_compact("2024-03-15").is_err());
    assert!(from_compact("2024031").is_err());
    assert!(from_compact("20241301").is_err());
    assert!(from_compact("").is_err());
  }

  #[test]
  fn stored_accepts_both_encodings() {
    assert_eq!(from_stored("2024-03-15").unwrap(), d("2024-03-15"));
    // Legacy rows predate the canonical encoding and must keep parsing.
    assert_eq!(from_stored("20240315").unwrap(), d("2024-03-15"));
    assert!(from_stored("yesterday").is_err());
  }

  // ── Window computation ────────────────────────────────────────────────────

  #[test]
  fn window_starts_after_last_ingested_date() {
    let window =
      DateWindow::compute(Some(d("2024-03-10")), d("2024-03-15"), 30).unwrap();
    assert_eq!(window.start, d("2024-03-11"));
    assert_eq!(window.end, d("2024-03-15"));
  }

  #[test]
  fn empty_dimension_falls_back_to_initial_window() {
    let window = DateWindow::compute(None, d("2024-03-15"), 30).unwrap();
    assert_eq!(window.start, d("2024-02-14"));
    assert_eq!(window.end, d("2024-03-15"));
  }

  #[test]
  fn already_ingested_today_yields_no_window() {
    assert_eq!(DateWindow::compute(Some(d("2024-03-15")), d("2024-03-15"), 30), None);
    assert_eq!(DateWindow::compute(Some(d("2024-03-20")), d("2024-03-15"), 30), None);
  }

  #[test]
  fn yesterdays_watermark_yields_a_single_day() {
    let window =
      DateWindow::compute(Some(d("2024-03-14")), d("2024-03-15"), 30).unwrap();
    assert_eq!(window.start, window.end);
  }
}
