//! Error types for `garner-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A date string matching neither the canonical nor the legacy compact
  /// encoding.
  #[error("unparseable calendar date: {0:?}")]
  InvalidDate(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
