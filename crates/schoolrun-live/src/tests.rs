//! Pipeline tests: ingestion through proximity and fan-out, against an
//! in-memory SQLite store.

use std::sync::Arc;

use schoolrun_core::{
  fix::{NewFix, SubjectKind},
  geo::Coordinate,
  guardianship::GuardianshipEdge,
  proximity::DEFAULT_ARRIVAL_THRESHOLD_METERS,
  reference::NewReference,
  session::{Role, ViewerSession},
  store::TrackingStore,
};
use schoolrun_store_sqlite::SqliteStore;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{Tracker, TrackingEvent};

async fn tracker() -> Tracker<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  Tracker::new(Arc::new(store), DEFAULT_ARRIVAL_THRESHOLD_METERS)
}

fn coord(lat: f64, lon: f64) -> Coordinate {
  Coordinate::new(lat, lon).unwrap()
}

fn reference(rider: Uuid, driver: Option<Uuid>, lat: f64, lon: f64) -> NewReference {
  NewReference {
    rider_id:   rider,
    driver_id:  driver,
    coordinate: coord(lat, lon),
    address:    "12 Hledan Rd".to_string(),
  }
}

fn driver_fix(driver: Uuid, lat: f64, lon: f64) -> NewFix {
  NewFix {
    subject_kind:    SubjectKind::Driver,
    subject_id:      driver,
    coordinate:      coord(lat, lon),
    accuracy_meters: Some(5.0),
  }
}

fn rider_fix(rider: Uuid, lat: f64, lon: f64) -> NewFix {
  NewFix {
    subject_kind:    SubjectKind::Rider,
    subject_id:      rider,
    coordinate:      coord(lat, lon),
    accuracy_meters: None,
  }
}

/// Delivery inside `submit_fix` is synchronous, so everything a session is
/// entitled to is already queued once the call returns.
fn drain(rx: &mut mpsc::UnboundedReceiver<TrackingEvent>) -> Vec<TrackingEvent> {
  let mut events = Vec::new();
  while let Ok(event) = rx.try_recv() {
    events.push(event);
  }
  events
}

fn names(events: &[TrackingEvent]) -> Vec<&'static str> {
  events.iter().map(TrackingEvent::name).collect()
}

// ─── Proximity scenarios ─────────────────────────────────────────────────────

#[tokio::test]
async fn fix_at_reference_is_arrived_then_flips_back() {
  let t = tracker().await;
  let driver = Uuid::new_v4();
  let rider = Uuid::new_v4();

  t.upsert_reference(reference(rider, Some(driver), 16.840, 96.170))
    .await
    .unwrap();

  let (_, mut rx) = t.subscribe(ViewerSession::new(Role::Admin, None));

  // At the reference coordinate.
  t.submit_fix(driver_fix(driver, 16.840, 96.170)).await.unwrap();
  let events = drain(&mut rx);
  assert_eq!(names(&events), vec!["fix", "proximity"]);
  let TrackingEvent::ProximityUpdated(state) = &events[1] else {
    panic!("expected proximity event");
  };
  assert!(state.arrived);
  assert!(state.distance_meters.abs() < 1e-6);
  assert_eq!(state.rider_id, rider);

  // ~555 m north: arrived is not a one-way latch.
  t.submit_fix(driver_fix(driver, 16.845, 96.170)).await.unwrap();
  let events = drain(&mut rx);
  let TrackingEvent::ProximityUpdated(state) = &events[1] else {
    panic!("expected proximity event");
  };
  assert!(!state.arrived);
  assert!(
    (550.0..560.0).contains(&state.distance_meters),
    "distance: {}",
    state.distance_meters
  );
}

#[tokio::test]
async fn driver_fix_covers_every_assigned_rider() {
  let t = tracker().await;
  let driver = Uuid::new_v4();
  let (r1, r2) = (Uuid::new_v4(), Uuid::new_v4());

  t.upsert_reference(reference(r1, Some(driver), 16.840, 96.170)).await.unwrap();
  t.upsert_reference(reference(r2, Some(driver), 16.845, 96.170)).await.unwrap();

  let (_, mut rx) = t.subscribe(ViewerSession::new(Role::Admin, None));
  t.submit_fix(driver_fix(driver, 16.840, 96.170)).await.unwrap();

  let events = drain(&mut rx);
  assert_eq!(names(&events), vec!["fix", "proximity", "proximity"]);

  let arrived: Vec<bool> = events[1..]
    .iter()
    .map(|e| match e {
      TrackingEvent::ProximityUpdated(s) => s.arrived,
      other => panic!("unexpected event: {other:?}"),
    })
    .collect();
  assert_eq!(arrived.iter().filter(|a| **a).count(), 1, "only r1 is in range");
}

#[tokio::test]
async fn rider_fix_produces_no_proximity() {
  let t = tracker().await;
  let rider = Uuid::new_v4();

  let (_, mut rx) = t.subscribe(ViewerSession::new(Role::Admin, None));
  t.submit_fix(rider_fix(rider, 16.840, 96.170)).await.unwrap();

  assert_eq!(names(&drain(&mut rx)), vec!["fix"]);
}

#[tokio::test]
async fn engine_keeps_only_the_latest_pair_state() {
  let t = tracker().await;
  let driver = Uuid::new_v4();
  let rider = Uuid::new_v4();

  t.upsert_reference(reference(rider, Some(driver), 16.840, 96.170))
    .await
    .unwrap();

  t.submit_fix(driver_fix(driver, 16.840, 96.170)).await.unwrap();
  assert!(t.engine().latest(driver, rider).unwrap().arrived);

  t.submit_fix(driver_fix(driver, 16.845, 96.170)).await.unwrap();
  assert!(!t.engine().latest(driver, rider).unwrap().arrived);
}

// ─── Reassignment ────────────────────────────────────────────────────────────

#[tokio::test]
async fn reassignment_moves_proximity_to_the_new_driver() {
  let t = tracker().await;
  let (d1, d2) = (Uuid::new_v4(), Uuid::new_v4());
  let rider = Uuid::new_v4();

  t.upsert_reference(reference(rider, Some(d1), 16.840, 96.170)).await.unwrap();

  let (_, mut rx) = t.subscribe(ViewerSession::new(Role::Admin, None));

  t.submit_fix(driver_fix(d1, 16.840, 96.170)).await.unwrap();
  assert_eq!(names(&drain(&mut rx)), vec!["fix", "proximity"]);

  // Reassign the rider to d2.
  t.upsert_reference(reference(rider, Some(d2), 16.840, 96.170)).await.unwrap();
  assert_eq!(names(&drain(&mut rx)), vec!["reference"]);

  // The old driver's next fix no longer targets the rider...
  t.submit_fix(driver_fix(d1, 16.840, 96.170)).await.unwrap();
  assert_eq!(names(&drain(&mut rx)), vec!["fix"]);

  // ...and the new driver's next fix does.
  t.submit_fix(driver_fix(d2, 16.840, 96.170)).await.unwrap();
  let events = drain(&mut rx);
  assert_eq!(names(&events), vec!["fix", "proximity"]);
  let TrackingEvent::ProximityUpdated(state) = &events[1] else {
    panic!("expected proximity event");
  };
  assert_eq!(state.driver_id, d2);
  assert_eq!(state.rider_id, rider);
}

#[tokio::test]
async fn reassignment_reaches_open_parent_session_without_reconnect() {
  let t = tracker().await;
  let (d1, d2) = (Uuid::new_v4(), Uuid::new_v4());
  let (parent, child) = (Uuid::new_v4(), Uuid::new_v4());

  t.store()
    .add_guardian(GuardianshipEdge {
      parent_id:    parent,
      rider_id:     child,
      relationship: "father".to_string(),
    })
    .await
    .unwrap();
  t.upsert_reference(reference(child, Some(d1), 16.840, 96.170)).await.unwrap();

  let (_, mut rx) = t.subscribe(ViewerSession::new(Role::Parent, Some(parent)));

  // d1 is the child's driver: visible.
  t.submit_fix(driver_fix(d1, 16.841, 96.170)).await.unwrap();
  assert_eq!(names(&drain(&mut rx)), vec!["fix", "proximity"]);

  // Reassign to d2 mid-session; the parent sees the registry change too.
  t.upsert_reference(reference(child, Some(d2), 16.840, 96.170)).await.unwrap();
  assert_eq!(names(&drain(&mut rx)), vec!["reference"]);

  // d1 is now just some other driver.
  t.submit_fix(driver_fix(d1, 16.841, 96.170)).await.unwrap();
  assert!(drain(&mut rx).is_empty());

  t.submit_fix(driver_fix(d2, 16.841, 96.170)).await.unwrap();
  assert_eq!(names(&drain(&mut rx)), vec!["fix", "proximity"]);
}

// ─── Role-scoped visibility ──────────────────────────────────────────────────

#[tokio::test]
async fn parent_never_sees_unrelated_riders() {
  let t = tracker().await;
  let parent = Uuid::new_v4();
  let (own_child, other_rider) = (Uuid::new_v4(), Uuid::new_v4());
  let (own_driver, other_driver) = (Uuid::new_v4(), Uuid::new_v4());

  t.store()
    .add_guardian(GuardianshipEdge {
      parent_id:    parent,
      rider_id:     own_child,
      relationship: "mother".to_string(),
    })
    .await
    .unwrap();
  t.upsert_reference(reference(own_child, Some(own_driver), 16.840, 96.170))
    .await
    .unwrap();
  t.upsert_reference(reference(other_rider, Some(other_driver), 16.850, 96.180))
    .await
    .unwrap();

  let (_, mut rx) = t.subscribe(ViewerSession::new(Role::Parent, Some(parent)));

  // Another family's driver and rider reach the internal pipeline but must
  // never reach this session.
  t.submit_fix(driver_fix(other_driver, 16.850, 96.180)).await.unwrap();
  t.submit_fix(rider_fix(other_rider, 16.850, 96.180)).await.unwrap();
  assert!(drain(&mut rx).is_empty());

  // Their own child's driver is visible.
  t.submit_fix(driver_fix(own_driver, 16.840, 96.170)).await.unwrap();
  assert_eq!(names(&drain(&mut rx)), vec!["fix", "proximity"]);
}

#[tokio::test]
async fn driver_sees_self_and_assigned_riders_only() {
  let t = tracker().await;
  let (driver, other_driver) = (Uuid::new_v4(), Uuid::new_v4());
  let (assigned, unassigned) = (Uuid::new_v4(), Uuid::new_v4());

  t.upsert_reference(reference(assigned, Some(driver), 16.840, 96.170)).await.unwrap();
  t.upsert_reference(reference(unassigned, Some(other_driver), 16.850, 96.180))
    .await
    .unwrap();

  let (_, mut rx) = t.subscribe(ViewerSession::new(Role::Driver, Some(driver)));

  t.submit_fix(driver_fix(other_driver, 16.850, 96.180)).await.unwrap();
  t.submit_fix(rider_fix(unassigned, 16.850, 96.180)).await.unwrap();
  assert!(drain(&mut rx).is_empty());

  t.submit_fix(driver_fix(driver, 16.840, 96.170)).await.unwrap();
  assert_eq!(names(&drain(&mut rx)), vec!["fix", "proximity"]);

  t.submit_fix(rider_fix(assigned, 16.840, 96.170)).await.unwrap();
  assert_eq!(names(&drain(&mut rx)), vec!["fix"]);
}

#[tokio::test]
async fn admin_wildcard_sees_everything() {
  let t = tracker().await;
  let (_, mut rx) = t.subscribe(ViewerSession::new(Role::Admin, None));

  t.submit_fix(driver_fix(Uuid::new_v4(), 16.840, 96.170)).await.unwrap();
  t.submit_fix(rider_fix(Uuid::new_v4(), 16.850, 96.180)).await.unwrap();

  assert_eq!(names(&drain(&mut rx)), vec!["fix", "fix"]);
}

#[tokio::test]
async fn session_without_identity_receives_nothing() {
  let t = tracker().await;
  let driver = Uuid::new_v4();
  let rider = Uuid::new_v4();

  t.upsert_reference(reference(rider, Some(driver), 16.840, 96.170)).await.unwrap();

  // A driver-role session with no resolvable identity is an authorization
  // gap: authorized for nothing, and harmless to everyone else.
  let (_, mut gap_rx) = t.subscribe(ViewerSession::new(Role::Driver, None));
  let (_, mut admin_rx) = t.subscribe(ViewerSession::new(Role::Admin, None));

  t.submit_fix(driver_fix(driver, 16.840, 96.170)).await.unwrap();

  assert!(drain(&mut gap_rx).is_empty());
  assert_eq!(names(&drain(&mut admin_rx)), vec!["fix", "proximity"]);
}

#[tokio::test]
async fn reference_changes_go_to_guardians_not_strangers() {
  let t = tracker().await;
  let (parent, stranger) = (Uuid::new_v4(), Uuid::new_v4());
  let child = Uuid::new_v4();

  t.store()
    .add_guardian(GuardianshipEdge {
      parent_id:    parent,
      rider_id:     child,
      relationship: "mother".to_string(),
    })
    .await
    .unwrap();

  let (_, mut parent_rx) = t.subscribe(ViewerSession::new(Role::Parent, Some(parent)));
  let (_, mut stranger_rx) = t.subscribe(ViewerSession::new(Role::Parent, Some(stranger)));

  t.upsert_reference(reference(child, Some(Uuid::new_v4()), 16.840, 96.170))
    .await
    .unwrap();

  assert_eq!(names(&drain(&mut parent_rx)), vec!["reference"]);
  assert!(drain(&mut stranger_rx).is_empty());
}

// ─── Session lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn dropped_receiver_is_pruned_on_next_delivery() {
  let t = tracker().await;

  let (_, rx) = t.subscribe(ViewerSession::new(Role::Admin, None));
  assert_eq!(t.open_sessions(), 1);
  drop(rx);

  t.submit_fix(driver_fix(Uuid::new_v4(), 16.840, 96.170)).await.unwrap();
  assert_eq!(t.open_sessions(), 0);
}

#[tokio::test]
async fn unsubscribe_removes_the_session() {
  let t = tracker().await;

  let (session_id, mut rx) = t.subscribe(ViewerSession::new(Role::Admin, None));
  t.unsubscribe(session_id);
  assert_eq!(t.open_sessions(), 0);

  t.submit_fix(driver_fix(Uuid::new_v4(), 16.840, 96.170)).await.unwrap();
  assert!(drain(&mut rx).is_empty());
}
