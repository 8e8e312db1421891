//! Proximity state — distance from a driver's latest fix to an assigned
//! rider's reference coordinate, thresholded into an "arrived" flag.
//!
//! Proximity is a pure function of the latest driver fix and the rider's
//! reference coordinate. It is recomputed idempotently on every fix and never
//! persisted; `arrived` flips back to `false` as soon as a later fix is
//! outside the threshold again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  geo::{Coordinate, haversine_meters},
  reference::RiderReference,
};

/// Default geofence radius: a driver within this many meters of a rider's
/// reference coordinate counts as arrived.
pub const DEFAULT_ARRIVAL_THRESHOLD_METERS: f64 = 10.0;

/// Derived per-`(driver, rider)` state. Held in memory only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityState {
  pub driver_id:       Uuid,
  pub rider_id:        Uuid,
  pub distance_meters: f64,
  pub arrived:         bool,
  pub computed_at:     DateTime<Utc>,
}

/// Compute the proximity of a driver at `position` to one assigned rider.
pub fn proximity(
  driver_id: Uuid,
  position: Coordinate,
  reference: &RiderReference,
  threshold_meters: f64,
) -> ProximityState {
  let distance_meters = haversine_meters(position, reference.coordinate);
  ProximityState {
    driver_id,
    rider_id: reference.rider_id,
    distance_meters,
    arrived: distance_meters <= threshold_meters,
    computed_at: Utc::now(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn reference_at(lat: f64, lon: f64) -> RiderReference {
    RiderReference {
      rider_id:   Uuid::new_v4(),
      driver_id:  Some(Uuid::new_v4()),
      coordinate: Coordinate::new(lat, lon).unwrap(),
      address:    "12 Hledan Rd".to_string(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn at_the_reference_coordinate_is_arrived() {
    let reference = reference_at(16.840, 96.170);
    let state = proximity(
      Uuid::new_v4(),
      reference.coordinate,
      &reference,
      DEFAULT_ARRIVAL_THRESHOLD_METERS,
    );
    assert!(state.arrived);
    assert!(state.distance_meters.abs() < 1e-6);
  }

  #[test]
  fn five_hundred_meters_away_is_not_arrived() {
    let reference = reference_at(16.840, 96.170);
    let position = Coordinate::new(16.845, 96.170).unwrap();
    let state = proximity(
      Uuid::new_v4(),
      position,
      &reference,
      DEFAULT_ARRIVAL_THRESHOLD_METERS,
    );
    assert!(!state.arrived);
    assert!(
      (550.0..560.0).contains(&state.distance_meters),
      "distance: {}",
      state.distance_meters
    );
  }

  #[test]
  fn just_over_ten_kilometers_is_not_arrived() {
    // ~0.09° of latitude is a shade over 10,001 m.
    let reference = reference_at(16.840, 96.170);
    let position = Coordinate::new(16.930, 96.170).unwrap();
    let state = proximity(
      Uuid::new_v4(),
      position,
      &reference,
      DEFAULT_ARRIVAL_THRESHOLD_METERS,
    );
    assert!(!state.arrived);
    assert!(state.distance_meters > 10_001.0);
  }

  #[test]
  fn threshold_boundary_is_inclusive() {
    let reference = reference_at(16.840, 96.170);
    let state = proximity(
      Uuid::new_v4(),
      reference.coordinate,
      &reference,
      0.0,
    );
    assert!(state.arrived, "distance 0 must satisfy threshold 0");
  }
}
