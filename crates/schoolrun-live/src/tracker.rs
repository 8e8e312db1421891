//! [`Tracker`] — the facade tying ingestion, the proximity engine, and
//! fan-out together over one [`TrackingStore`].

use std::sync::Arc;

use schoolrun_core::{
  fix::{NewFix, PositionFix},
  reference::{NewReference, RiderReference},
  session::ViewerSession,
  store::TrackingStore,
};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{engine::ProximityEngine, event::TrackingEvent, fanout::SessionRegistry};

pub struct Tracker<S> {
  store:    Arc<S>,
  engine:   ProximityEngine,
  sessions: SessionRegistry,
}

impl<S: TrackingStore> Tracker<S> {
  pub fn new(store: Arc<S>, arrival_threshold_meters: f64) -> Self {
    Self {
      store,
      engine: ProximityEngine::new(arrival_threshold_meters),
      sessions: SessionRegistry::new(),
    }
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  pub fn engine(&self) -> &ProximityEngine {
    &self.engine
  }

  /// Open a live feed session. The caller drains the returned receiver;
  /// dropping it (or calling [`Tracker::unsubscribe`]) ends the session.
  pub fn subscribe(
    &self,
    session: ViewerSession,
  ) -> (Uuid, mpsc::UnboundedReceiver<TrackingEvent>) {
    self.sessions.register(session)
  }

  pub fn unsubscribe(&self, session_id: Uuid) {
    self.sessions.unregister(session_id);
  }

  pub fn open_sessions(&self) -> usize {
    self.sessions.open_sessions()
  }

  /// Ingest one fix: append it, run the proximity engine, fan out.
  ///
  /// No internal retry or buffering — a store failure surfaces to the caller
  /// and the component stays stateless. Coordinates are already validated
  /// upstream by `Coordinate::new`.
  pub async fn submit_fix(&self, input: NewFix) -> Result<PositionFix, S::Error> {
    let fix = self.store.insert_fix(input).await?;
    tracing::debug!(
      subject = %fix.subject_id,
      latitude = fix.coordinate.latitude,
      longitude = fix.coordinate.longitude,
      "fix accepted"
    );

    let mut events = vec![TrackingEvent::FixAccepted(fix.clone())];
    let states = self.engine.on_fix(self.store.as_ref(), &fix).await?;
    events.extend(states.into_iter().map(TrackingEvent::ProximityUpdated));

    self.sessions.deliver(self.store.as_ref(), &events).await;
    Ok(fix)
  }

  /// Upsert a rider's reference and notify open sessions, so a reassignment
  /// is reflected everywhere without a reconnect.
  pub async fn upsert_reference(
    &self,
    input: NewReference,
  ) -> Result<RiderReference, S::Error> {
    let reference = self.store.upsert_reference(input).await?;
    tracing::debug!(rider = %reference.rider_id, driver = ?reference.driver_id, "reference upserted");

    self
      .sessions
      .deliver(
        self.store.as_ref(),
        &[TrackingEvent::ReferenceChanged(reference.clone())],
      )
      .await;
    Ok(reference)
  }
}
