//! Encoding helpers between domain dates and the plain-text representation
//! stored in the dimension column.

use chrono::NaiveDate;
use garner_core::date;

use crate::Result;

/// Dates are stored in the canonical hyphenated form.
pub fn encode_date(d: NaiveDate) -> String {
  date::to_canonical(d)
}

/// Decode a dimension value, accepting legacy compact rows.
pub fn decode_date(s: &str) -> Result<NaiveDate> {
  Ok(date::from_stored(s)?)
}
