//! [`SqliteStore`] — the SQLite implementation of [`MetricStore`].

use std::{collections::BTreeMap, path::Path};

use chrono::NaiveDate;
use garner_core::{
  record::{ReportBatch, SaveSummary},
  store::MetricStore,
};
use rusqlite::params;

use crate::{
  Error, Result,
  encode::{decode_date, encode_date},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A metric store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Insert-or-ignore on the unique calendar value, then select the surrogate
/// id. Runs inside whatever transaction the caller holds, so a rolled-back
/// save takes its dimension inserts with it.
fn upsert_date_id(
  conn: &rusqlite::Connection,
  date_str: &str,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT OR IGNORE INTO dates (date) VALUES (?1)",
    params![date_str],
  )?;
  conn.query_row(
    "SELECT date_id FROM dates WHERE date = ?1",
    params![date_str],
    |row| row.get(0),
  )
}

// ─── MetricStore impl ────────────────────────────────────────────────────────

impl MetricStore for SqliteStore {
  type Error = Error;

  async fn ensure_schema(&self) -> Result<()> {
    self.init_schema().await
  }

  async fn resolve_date(&self, date: NaiveDate) -> Result<i64> {
    let date_str = encode_date(date);
    let id = self
      .conn
      .call(move |conn| Ok(upsert_date_id(conn, &date_str)?))
      .await?;
    Ok(id)
  }

  async fn last_ingested_date(&self) -> Result<Option<NaiveDate>> {
    // MAX over an empty table yields a single NULL row.
    let max: Option<String> = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT MAX(date) FROM dates", [], |row| row.get(0))?)
      })
      .await?;
    max.as_deref().map(decode_date).transpose()
  }

  async fn save(&self, batch: &ReportBatch) -> Result<SaveSummary> {
    let batch = batch.clone();
    let summary = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Dimension rows first: every fact row below references an id
        // resolved here, within the same transaction scope.
        let mut date_ids: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for date in batch.distinct_dates() {
          let id = upsert_date_id(&tx, &encode_date(date))?;
          date_ids.insert(date, id);
        }

        for r in &batch.engagement {
          tx.execute(
            "INSERT INTO engagement_metrics (
               date_id, users, sessions, engagement_rate, conversions,
               average_session_duration
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
              date_ids[&r.date],
              r.users,
              r.sessions,
              r.engagement_rate,
              r.conversions,
              r.average_session_duration,
            ],
          )?;
        }

        for r in &batch.content {
          tx.execute(
            "INSERT INTO content_metrics (
               date_id, page_title, page_views, sessions, engagement_rate,
               session_duration
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
              date_ids[&r.date],
              r.page_title,
              r.page_views,
              r.sessions,
              r.engagement_rate,
              r.session_duration,
            ],
          )?;
        }

        for r in &batch.site_search {
          tx.execute(
            "INSERT INTO site_search_metrics (
               date_id, search_term, clicks, impressions
             ) VALUES (?1, ?2, ?3, ?4)",
            params![date_ids[&r.date], r.search_term, r.clicks, r.impressions],
          )?;
        }

        tx.commit()?;

        Ok(SaveSummary {
          dates:            date_ids.len(),
          engagement_rows:  batch.engagement.len(),
          content_rows:     batch.content.len(),
          site_search_rows: batch.site_search.len(),
        })
      })
      .await?;
    Ok(summary)
  }
}
