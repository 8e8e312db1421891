//! Rider reference locations — the pickup/home coordinate each rider is
//! tracked against, plus the driver currently assigned to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

/// A rider's designated pickup/home location and driver assignment.
///
/// At most one active reference exists per rider; upserts replace the
/// previous row. `driver_id = None` means the rider is currently unassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderReference {
  pub rider_id:   Uuid,
  pub driver_id:  Option<Uuid>,
  #[serde(flatten)]
  pub coordinate: Coordinate,
  pub address:    String,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::TrackingStore::upsert_reference`].
/// `updated_at` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewReference {
  pub rider_id:   Uuid,
  pub driver_id:  Option<Uuid>,
  pub coordinate: Coordinate,
  pub address:    String,
}
