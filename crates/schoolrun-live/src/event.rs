//! Events carried by the live pipeline.

use schoolrun_core::{
  fix::{PositionFix, SubjectKind},
  proximity::ProximityState,
  reference::RiderReference,
};
use uuid::Uuid;

/// One delta flowing from ingestion (or the registry) to connected viewers.
#[derive(Debug, Clone)]
pub enum TrackingEvent {
  /// A position fix was accepted by the store.
  FixAccepted(PositionFix),
  /// The proximity engine recomputed one `(driver, rider)` pair.
  ProximityUpdated(ProximityState),
  /// A rider's reference location or driver assignment changed.
  ReferenceChanged(RiderReference),
}

impl TrackingEvent {
  /// The SSE event name clients subscribe on.
  pub fn name(&self) -> &'static str {
    match self {
      Self::FixAccepted(_) => "fix",
      Self::ProximityUpdated(_) => "proximity",
      Self::ReferenceChanged(_) => "reference",
    }
  }

  /// The subject claims a viewer must be authorized for, all of them, before
  /// this event may be delivered.
  ///
  /// A proximity update names both parties: it reveals the driver's position
  /// relative to the rider's home coordinate, so the viewer must be entitled
  /// to both.
  pub fn subjects(&self) -> Vec<(SubjectKind, Uuid)> {
    match self {
      Self::FixAccepted(fix) => vec![(fix.subject_kind, fix.subject_id)],
      Self::ProximityUpdated(state) => vec![
        (SubjectKind::Driver, state.driver_id),
        (SubjectKind::Rider, state.rider_id),
      ],
      Self::ReferenceChanged(reference) => {
        vec![(SubjectKind::Rider, reference.rider_id)]
      }
    }
  }

  /// Serialise the payload (without the event name) for the wire.
  pub fn payload_json(&self) -> serde_json::Result<String> {
    match self {
      Self::FixAccepted(fix) => serde_json::to_string(fix),
      Self::ProximityUpdated(state) => serde_json::to_string(state),
      Self::ReferenceChanged(reference) => serde_json::to_string(reference),
    }
  }
}
