//! Error types for the garner-normalize codec.

use garner_core::report::Category;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{category} row is missing dimension value {index}")]
  MissingDimension { category: Category, index: usize },

  #[error("{category} row is missing metric value {index} ({field})")]
  MissingMetric {
    category: Category,
    index:    usize,
    field:    &'static str,
  },

  #[error("invalid date in {category} row: {value:?}")]
  InvalidDate { category: Category, value: String },

  #[error("invalid {field} in {category} row: {value:?}")]
  InvalidNumber {
    category: Category,
    field:    &'static str,
    value:    String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
