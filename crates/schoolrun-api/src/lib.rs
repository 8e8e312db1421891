//! JSON/SSE HTTP surface for the schoolrun tracking service.
//!
//! Exposes an axum [`Router`] backed by any
//! [`schoolrun_core::store::TrackingStore`] through a
//! [`schoolrun_live::Tracker`]. Authentication, TLS, and transport concerns
//! belong to the upstream proxy; this layer performs authorization only.

pub mod error;
pub mod feed;
pub mod guardians;
pub mod locations;
pub mod references;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use schoolrun_core::{proximity::DEFAULT_ARRIVAL_THRESHOLD_METERS, store::TrackingStore};
use schoolrun_live::Tracker;
use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `SCHOOLRUN_*` environment overrides.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Geofence radius for the proximity engine.
  #[serde(default = "default_arrival_threshold")]
  pub arrival_threshold_meters: f64,
}

fn default_arrival_threshold() -> f64 {
  DEFAULT_ARRIVAL_THRESHOLD_METERS
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub tracker: Arc<Tracker<S>>,
  pub config:  Arc<ServerConfig>,
}

// Manual impl: `Arc` fields clone regardless of whether `S` does.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      tracker: Arc::clone(&self.tracker),
      config:  Arc::clone(&self.config),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TrackingStore + 'static,
{
  Router::new()
    // Position ingestion
    .route("/locations", post(locations::submit::<S>))
    .route(
      "/locations/{kind}/{subject_id}/latest",
      get(locations::latest::<S>),
    )
    // Reference registry
    .route("/references", get(references::assigned::<S>))
    .route(
      "/references/{rider_id}",
      put(references::upsert::<S>).get(references::get_one::<S>),
    )
    // Guardianship (enrollment shim)
    .route("/guardians", post(guardians::create::<S>))
    // Live feed
    .route("/feed", get(feed::handler::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
