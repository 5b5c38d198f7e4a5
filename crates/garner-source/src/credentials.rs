//! Service-credential loading for the reporting API.
//!
//! The credential file is JSON carrying the service-account identity and a
//! ready-to-use bearer token. Token minting and refresh happen outside this
//! process; the pipeline reads the file once at startup.

use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
  /// Service-account identity; used in logs, never sent on the wire.
  #[serde(default)]
  pub account: Option<String>,

  /// Bearer token presented to the reporting API.
  pub token: String,
}

impl Credentials {
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| {
      Error::CredentialsIo { path: path.to_path_buf(), source }
    })?;
    serde_json::from_str(&raw).map_err(|source| Error::CredentialsParse {
      path:   path.to_path_buf(),
      source,
    })
  }
}
