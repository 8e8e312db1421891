//! Position fixes — one GPS sample from a subject's device.
//!
//! Fixes are strictly append-only. Once accepted, a fix is never updated;
//! retention and pruning are deployment concerns outside this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

/// Which kind of entity a fix (or an event) is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
  Driver,
  Rider,
}

/// One accepted GPS sample.
///
/// `captured_at` is assigned by the store and strictly increases per
/// `subject_id` in the order fixes are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionFix {
  pub fix_id:          Uuid,
  pub subject_kind:    SubjectKind,
  pub subject_id:      Uuid,
  #[serde(flatten)]
  pub coordinate:      Coordinate,
  pub accuracy_meters: Option<f64>,
  pub captured_at:     DateTime<Utc>,
}

/// Input to [`crate::store::TrackingStore::insert_fix`].
/// `fix_id` and `captured_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewFix {
  pub subject_kind:    SubjectKind,
  pub subject_id:      Uuid,
  pub coordinate:      Coordinate,
  pub accuracy_meters: Option<f64>,
}
