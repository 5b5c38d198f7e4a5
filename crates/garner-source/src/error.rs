//! Error type for `garner-source`.

use std::path::PathBuf;

use garner_core::report::Transient;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// Non-2xx response from the reporting API.
  #[error("reporting api returned http {status} for {url}")]
  Status { status: u16, url: String },

  #[error("reading credentials {path}: {source}")]
  CredentialsIo {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("parsing credentials {path}: {source}")]
  CredentialsParse {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

impl Transient for Error {
  /// Timeouts, connection failures, rate limiting and server errors are
  /// worth another attempt; everything else is not.
  fn is_transient(&self) -> bool {
    match self {
      Self::Transport(err) => {
        err.is_timeout() || err.is_connect() || err.is_request()
      }
      Self::Status { status, .. } => {
        *status == 429 || (500..600).contains(status)
      }
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
