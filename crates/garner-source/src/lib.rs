//! Reporting-API collaborator for garner.
//!
//! Provides the production [`ReportSource`](garner_core::report::ReportSource)
//! implementation — a thin HTTP binding over the hosted `runReport` endpoint —
//! plus the per-category request catalog and the retrying [`ReportFetcher`]
//! that issues all three category queries over one window with bounded
//! exponential backoff.

pub mod error;

mod credentials;
mod fetch;
mod http;

pub use credentials::Credentials;
pub use error::{Error, Result};
pub use fetch::{BackoffPolicy, ReportFetcher, request_for};
pub use http::{DEFAULT_API_BASE, HttpReportSource};
