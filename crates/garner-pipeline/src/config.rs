//! Job configuration.
//!
//! Resolved once at startup from an optional `garner.toml` layered under
//! `GARNER_*` environment variables, then passed immutably through every
//! component entry point. The job takes no CLI arguments.

use std::path::PathBuf;

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
  /// Reporting property to query.
  pub property_id: String,

  /// Path to the service-account credential file.
  pub credentials_path: PathBuf,

  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,

  /// Directory receiving the per-category CSV snapshots.
  #[serde(default = "default_export_dir")]
  pub export_dir: PathBuf,

  #[serde(default = "default_log_path")]
  pub log_path: PathBuf,

  #[serde(default = "default_api_base")]
  pub api_base: String,

  /// Days fetched on the very first run, when no watermark exists yet.
  #[serde(default = "default_initial_window_days")]
  pub initial_window_days: u64,
}

fn default_database_path() -> PathBuf {
  PathBuf::from("garner.db")
}

fn default_export_dir() -> PathBuf {
  PathBuf::from(".")
}

fn default_log_path() -> PathBuf {
  PathBuf::from("garner.log")
}

fn default_api_base() -> String {
  garner_source::DEFAULT_API_BASE.to_string()
}

fn default_initial_window_days() -> u64 {
  30
}

impl JobConfig {
  /// Load `garner.toml` (if present) with `GARNER`-prefixed environment
  /// variables layered on top.
  pub fn load() -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::with_name("garner").required(false))
      .add_source(config::Environment::with_prefix("GARNER"))
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise JobConfig")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_fill_everything_but_identity() {
    let cfg: JobConfig = serde_json::from_value(serde_json::json!({
      "property_id": "123456",
      "credentials_path": "service-account.json",
    }))
    .unwrap();

    assert_eq!(cfg.database_path, PathBuf::from("garner.db"));
    assert_eq!(cfg.export_dir, PathBuf::from("."));
    assert_eq!(cfg.log_path, PathBuf::from("garner.log"));
    assert_eq!(cfg.api_base, garner_source::DEFAULT_API_BASE);
    assert_eq!(cfg.initial_window_days, 30);
  }

  #[test]
  fn identity_fields_are_required() {
    let result: Result<JobConfig, _> =
      serde_json::from_value(serde_json::json!({ "property_id": "123456" }));
    assert!(result.is_err());
  }
}
