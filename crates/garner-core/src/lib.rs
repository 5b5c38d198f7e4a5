//! Core domain types and trait seams for the garner ingestion pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing heavier than
//! `chrono` and `serde`.

pub mod date;
pub mod error;
pub mod record;
pub mod report;
pub mod store;

pub use error::{Error, Result};
