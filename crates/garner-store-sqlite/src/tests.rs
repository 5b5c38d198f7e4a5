//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use garner_core::{
  record::{ContentRecord, EngagementRecord, ReportBatch, SiteSearchRecord},
  store::MetricStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(s: &str) -> NaiveDate {
  s.parse().unwrap()
}

/// Run a scalar `SELECT COUNT(*)`-style query against the raw connection.
async fn count(store: &SqliteStore, sql: &'static str) -> i64 {
  store
    .conn
    .call(move |conn| Ok(conn.query_row(sql, [], |row| row.get(0))?))
    .await
    .unwrap()
}

async fn exec(store: &SqliteStore, sql: &'static str) {
  store
    .conn
    .call(move |conn| {
      conn.execute(sql, [])?;
      Ok(())
    })
    .await
    .unwrap()
}

fn one_day_batch(date: NaiveDate) -> ReportBatch {
  ReportBatch {
    engagement:  vec![EngagementRecord {
      date,
      users: 100,
      sessions: 120,
      engagement_rate: 0.55,
      conversions: 5,
      average_session_duration: 42.3,
    }],
    content:     vec![ContentRecord {
      date,
      page_title: "Home".into(),
      page_views: 300,
      sessions: 120,
      engagement_rate: 0.55,
      session_duration: 42.3,
    }],
    site_search: vec![SiteSearchRecord {
      date,
      search_term: "shoes".into(),
      clicks: 10,
      impressions: 200,
    }],
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_schema_is_idempotent() {
  let s = store().await;
  s.ensure_schema().await.unwrap();
  s.ensure_schema().await.unwrap();
  assert_eq!(count(&s, "SELECT COUNT(*) FROM dates").await, 0);
}

// ─── Date dimension ──────────────────────────────────────────────────────────

#[tokio::test]
async fn resolving_a_date_twice_returns_the_same_id() {
  let s = store().await;
  let first = s.resolve_date(d("2024-01-01")).await.unwrap();
  let second = s.resolve_date(d("2024-01-01")).await.unwrap();
  assert_eq!(first, second);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM dates").await, 1);
}

#[tokio::test]
async fn distinct_dates_get_distinct_ids() {
  let s = store().await;
  let a = s.resolve_date(d("2024-01-01")).await.unwrap();
  let b = s.resolve_date(d("2024-01-02")).await.unwrap();
  assert_ne!(a, b);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM dates").await, 2);
}

#[tokio::test]
async fn save_reuses_ids_resolved_before_the_call() {
  let s = store().await;
  let id = s.resolve_date(d("2024-01-01")).await.unwrap();
  s.save(&one_day_batch(d("2024-01-01"))).await.unwrap();

  assert_eq!(count(&s, "SELECT COUNT(*) FROM dates").await, 1);
  assert_eq!(
    count(&s, "SELECT date_id FROM engagement_metrics").await,
    id
  );
}

// ─── Watermark ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_dimension_has_no_watermark() {
  let s = store().await;
  assert_eq!(s.last_ingested_date().await.unwrap(), None);
}

#[tokio::test]
async fn watermark_is_the_maximum_dimension_date() {
  let s = store().await;
  s.resolve_date(d("2024-01-05")).await.unwrap();
  s.resolve_date(d("2024-01-01")).await.unwrap();
  assert_eq!(
    s.last_ingested_date().await.unwrap(),
    Some(d("2024-01-05"))
  );
}

#[tokio::test]
async fn watermark_parses_legacy_compact_rows() {
  let s = store().await;
  exec(&s, "INSERT INTO dates (date) VALUES ('20240315')").await;
  assert_eq!(
    s.last_ingested_date().await.unwrap(),
    Some(d("2024-03-15"))
  );
}

// ─── Save ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_writes_one_row_per_record() {
  let s = store().await;
  let summary = s.save(&one_day_batch(d("2024-01-01"))).await.unwrap();

  assert_eq!(summary.dates, 1);
  assert_eq!(summary.engagement_rows, 1);
  assert_eq!(summary.content_rows, 1);
  assert_eq!(summary.site_search_rows, 1);

  assert_eq!(count(&s, "SELECT COUNT(*) FROM dates").await, 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM engagement_metrics").await, 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM content_metrics").await, 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM site_search_metrics").await, 1);
}

#[tokio::test]
async fn saved_facts_always_reference_a_dimension_row() {
  let s = store().await;
  let mut batch = one_day_batch(d("2024-01-01"));
  batch.content.push(ContentRecord {
    date:             d("2024-01-02"),
    page_title:       String::new(),
    page_views:       1,
    sessions:         1,
    engagement_rate:  1.0,
    session_duration: 0.5,
  });
  s.save(&batch).await.unwrap();

  for sql in [
    "SELECT COUNT(*) FROM engagement_metrics f
     LEFT JOIN dates dt ON dt.date_id = f.date_id WHERE dt.date_id IS NULL",
    "SELECT COUNT(*) FROM content_metrics f
     LEFT JOIN dates dt ON dt.date_id = f.date_id WHERE dt.date_id IS NULL",
    "SELECT COUNT(*) FROM site_search_metrics f
     LEFT JOIN dates dt ON dt.date_id = f.date_id WHERE dt.date_id IS NULL",
  ] {
    assert_eq!(count(&s, sql).await, 0);
  }
}

#[tokio::test]
async fn overlapping_saves_duplicate_facts_but_not_dimension_rows() {
  // Facts carry no uniqueness on purpose; the watermark is the only gate
  // against re-ingesting a window. This pins the documented consequence.
  let s = store().await;
  s.save(&one_day_batch(d("2024-01-01"))).await.unwrap();
  s.save(&one_day_batch(d("2024-01-01"))).await.unwrap();

  assert_eq!(count(&s, "SELECT COUNT(*) FROM dates").await, 1);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM engagement_metrics").await, 2);
}

#[tokio::test]
async fn failed_save_commits_nothing() {
  let s = store().await;
  // Engagement rows insert before content rows; sabotaging the content
  // table fails the save midway through.
  exec(&s, "DROP TABLE content_metrics").await;

  let err = s.save(&one_day_batch(d("2024-01-01"))).await;
  assert!(err.is_err());

  assert_eq!(count(&s, "SELECT COUNT(*) FROM engagement_metrics").await, 0);
  assert_eq!(count(&s, "SELECT COUNT(*) FROM site_search_metrics").await, 0);
  // The dimension insert from this save rolled back with the facts.
  assert_eq!(count(&s, "SELECT COUNT(*) FROM dates").await, 0);
}

#[tokio::test]
async fn saving_an_empty_batch_is_a_no_op() {
  let s = store().await;
  let summary = s.save(&ReportBatch::default()).await.unwrap();
  assert_eq!(summary, Default::default());
  assert_eq!(count(&s, "SELECT COUNT(*) FROM dates").await, 0);
}
