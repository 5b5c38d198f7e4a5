//! HTTP binding for the hosted reporting API's `runReport` endpoint.
//!
//! One POST per report request, bearer-authenticated, camelCase JSON both
//! ways. The response's ordered dimension/metric value arrays are flattened
//! into [`ReportRow`]s; all downstream typing happens in `garner-normalize`.

use std::time::Duration;

use garner_core::report::{ReportRequest, ReportRow, ReportSource};
use serde::{Deserialize, Serialize};

use crate::{Credentials, Error, Result};

/// Hosted endpoint prefix; overridable through configuration for proxies
/// and tests.
pub const DEFAULT_API_BASE: &str = "https://analyticsdata.googleapis.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReportBody {
  date_ranges: Vec<WireDateRange>,
  dimensions:  Vec<WireName>,
  metrics:     Vec<WireName>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireDateRange {
  start_date: String,
  end_date:   String,
}

#[derive(Debug, Serialize)]
struct WireName {
  name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RunReportResponse {
  #[serde(default)]
  rows: Vec<WireRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRow {
  #[serde(default)]
  dimension_values: Vec<WireValue>,
  #[serde(default)]
  metric_values:    Vec<WireValue>,
}

#[derive(Debug, Deserialize)]
struct WireValue {
  #[serde(default)]
  value: String,
}

impl RunReportBody {
  fn from_request(request: &ReportRequest) -> Self {
    Self {
      date_ranges: vec![WireDateRange {
        start_date: request.window.start.to_string(),
        end_date:   request.window.end.to_string(),
      }],
      dimensions:  request
        .dimensions
        .iter()
        .map(|name| WireName { name: name.clone() })
        .collect(),
      metrics:     request
        .metrics
        .iter()
        .map(|name| WireName { name: name.clone() })
        .collect(),
    }
  }
}

// ─── Source ──────────────────────────────────────────────────────────────────

/// Production [`ReportSource`]: POSTs `runReport` for one property with
/// bearer auth.
#[derive(Debug, Clone)]
pub struct HttpReportSource {
  client:   reqwest::Client,
  api_base: String,
  token:    String,
}

impl HttpReportSource {
  pub fn new(api_base: impl Into<String>, credentials: &Credentials) -> Result<Self> {
    let api_base: String = api_base.into();
    let client = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()?;
    Ok(Self {
      client,
      api_base: api_base.trim_end_matches('/').to_string(),
      token: credentials.token.clone(),
    })
  }
}

impl ReportSource for HttpReportSource {
  type Error = Error;

  async fn run_report(&self, request: &ReportRequest) -> Result<Vec<ReportRow>> {
    let url = format!(
      "{}/v1beta/properties/{}:runReport",
      self.api_base, request.property_id
    );

    let response = self
      .client
      .post(&url)
      .bearer_auth(&self.token)
      .json(&RunReportBody::from_request(request))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(Error::Status { status: status.as_u16(), url });
    }

    let decoded: RunReportResponse = response.json().await?;
    Ok(
      decoded
        .rows
        .into_iter()
        .map(|row| ReportRow {
          dimension_values: row
            .dimension_values
            .into_iter()
            .map(|v| v.value)
            .collect(),
          metric_values:    row
            .metric_values
            .into_iter()
            .map(|v| v.value)
            .collect(),
        })
        .collect(),
    )
  }
}
