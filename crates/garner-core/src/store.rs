//! The `MetricStore` trait — the storage seam the pipeline writes through.
//!
//! Implemented by storage backends (e.g. `garner-store-sqlite`). The
//! orchestrator depends on this abstraction, not on any concrete backend.
//! A single writer per run is assumed throughout: date resolution is
//! get-or-create under that exclusivity, not under concurrent callers.

use std::future::Future;

use chrono::NaiveDate;

use crate::record::{ReportBatch, SaveSummary};

/// Abstraction over the relational metric store backend.
pub trait MetricStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create the dimension and fact tables if absent; no-op otherwise.
  fn ensure_schema(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Map a calendar date to its surrogate identifier, creating the
  /// dimension row on first sight. The same date always resolves to the
  /// same identifier; identifiers are never reassigned.
  fn resolve_date(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// The maximum calendar date present in the dimension, or `None` when the
  /// dimension is empty. Tolerates legacy compact-encoded rows.
  fn last_ingested_date(
    &self,
  ) -> impl Future<Output = Result<Option<NaiveDate>, Self::Error>> + Send + '_;

  /// Persist a batch atomically: resolve every distinct date, insert all
  /// fact rows against the resolved identifiers, commit. On failure the
  /// entire transaction — dimension inserts included — rolls back.
  fn save<'a>(
    &'a self,
    batch: &'a ReportBatch,
  ) -> impl Future<Output = Result<SaveSummary, Self::Error>> + Send + 'a;
}
