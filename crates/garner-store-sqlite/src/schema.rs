//! SQL schema for the garner SQLite store.
//!
//! Executed at connection startup and safe to re-run at any time; every
//! statement is `IF NOT EXISTS`. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL: one date dimension, three fact tables.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per calendar day, created lazily the first time any fact row
-- references that day. Values are canonical YYYY-MM-DD; rows written before
-- the canonical encoding was adopted may still carry compact YYYYMMDD.
CREATE TABLE IF NOT EXISTS dates (
    date_id INTEGER PRIMARY KEY AUTOINCREMENT,
    date    TEXT NOT NULL UNIQUE
);

-- Fact tables are strictly append-only. No UPDATE or DELETE is ever issued;
-- the date watermark is the only guard against re-ingesting a window.
CREATE TABLE IF NOT EXISTS engagement_metrics (
    engagement_id            INTEGER PRIMARY KEY AUTOINCREMENT,
    date_id                  INTEGER NOT NULL REFERENCES dates(date_id),
    users                    INTEGER NOT NULL,
    sessions                 INTEGER NOT NULL,
    engagement_rate          REAL NOT NULL,
    conversions              INTEGER NOT NULL,
    average_session_duration REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS content_metrics (
    content_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    date_id          INTEGER NOT NULL REFERENCES dates(date_id),
    page_title       TEXT NOT NULL,
    page_views       INTEGER NOT NULL,
    sessions         INTEGER NOT NULL,
    engagement_rate  REAL NOT NULL,
    session_duration REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS site_search_metrics (
    search_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    date_id     INTEGER NOT NULL REFERENCES dates(date_id),
    search_term TEXT NOT NULL,
    clicks      INTEGER NOT NULL,
    impressions INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS engagement_date_idx  ON engagement_metrics(date_id);
CREATE INDEX IF NOT EXISTS content_date_idx     ON content_metrics(date_id);
CREATE INDEX IF NOT EXISTS site_search_date_idx ON site_search_metrics(date_id);

PRAGMA user_version = 1;
";
