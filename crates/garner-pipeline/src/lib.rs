//! The garner batch job: configuration, orchestration, CSV export.
//!
//! The binary (`garner`) wires the SQLite store and the HTTP report source
//! into [`Pipeline::run`]: a run-to-completion state machine that computes
//! the fetch window from the stored watermark, fetches and normalizes the
//! three report categories, commits them in one transaction, and exports
//! per-category CSV snapshots.

pub mod config;
pub mod export;
pub mod pipeline;

pub use config::JobConfig;
pub use pipeline::{Pipeline, RunOutcome, Stage};
