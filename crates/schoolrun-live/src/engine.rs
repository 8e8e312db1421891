//! The proximity engine — continuous geofence recomputation.
//!
//! On every driver fix the engine recomputes the distance to each assigned
//! rider's reference coordinate. The result is a pure function of the latest
//! fix and the registry row; nothing is persisted, and `arrived` flips back
//! to `false` as soon as the driver moves outside the threshold again.

use std::{collections::HashMap, sync::Mutex};

use schoolrun_core::{
  fix::{PositionFix, SubjectKind},
  proximity::{ProximityState, proximity},
  store::TrackingStore,
};
use uuid::Uuid;

pub struct ProximityEngine {
  threshold_meters: f64,
  /// Latest state per `(driver, rider)` pair. Replaced wholesale on every
  /// recomputation; pairs whose assignment was removed simply stop updating.
  latest: Mutex<HashMap<(Uuid, Uuid), ProximityState>>,
}

impl ProximityEngine {
  pub fn new(threshold_meters: f64) -> Self {
    Self {
      threshold_meters,
      latest: Mutex::new(HashMap::new()),
    }
  }

  /// Recompute proximity for every rider currently assigned to the fix's
  /// driver. Non-driver fixes produce nothing.
  pub async fn on_fix<S: TrackingStore>(
    &self,
    store: &S,
    fix: &PositionFix,
  ) -> Result<Vec<ProximityState>, S::Error> {
    if fix.subject_kind != SubjectKind::Driver {
      return Ok(Vec::new());
    }

    let references = store.assigned_riders(fix.subject_id).await?;
    let mut states = Vec::with_capacity(references.len());

    // A poisoned lock only means a panic elsewhere mid-insert; the map is
    // still usable, so recover rather than propagate.
    let mut latest = self
      .latest
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner);
    for reference in &references {
      let state = proximity(
        fix.subject_id,
        fix.coordinate,
        reference,
        self.threshold_meters,
      );
      latest.insert((fix.subject_id, reference.rider_id), state.clone());
      states.push(state);
    }

    Ok(states)
  }

  /// The most recent state for one pair, if it has ever been computed.
  pub fn latest(&self, driver_id: Uuid, rider_id: Uuid) -> Option<ProximityState> {
    self
      .latest
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
      .get(&(driver_id, rider_id))
      .cloned()
  }
}
