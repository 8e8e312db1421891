//! Async HTTP client wrapping the schoolrun ingestion endpoint.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde_json::json;
use uuid::Uuid;

use crate::{pump::FixSink, source::Sample};

/// Async HTTP client for `POST /locations`.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct IngestClient {
  client:   Client,
  base_url: String,
}

impl IngestClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      base_url: base_url.into(),
    })
  }

  fn url(&self) -> String {
    format!("{}/locations", self.base_url.trim_end_matches('/'))
  }
}

impl FixSink for IngestClient {
  /// `POST /locations` with a driver subject.
  async fn submit(&self, driver_id: Uuid, sample: &Sample) -> Result<()> {
    let resp = self
      .client
      .post(self.url())
      .json(&json!({
        "driverId": driver_id,
        "latitude": sample.latitude,
        "longitude": sample.longitude,
        "accuracy": sample.accuracy_meters,
      }))
      .send()
      .await
      .context("POST /locations failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("POST /locations → {}", resp.status()));
    }
    Ok(())
  }
}
