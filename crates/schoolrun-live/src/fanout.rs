//! Live fan-out — per-session delivery with server-side re-authorization.
//!
//! The registry is the single table of open sessions: session id → viewer
//! claims + outbound channel, with an explicit register/unregister lifecycle
//! so an abrupt disconnect never leaks a listener.
//!
//! Authorization happens here, per event per session, immediately before
//! transmission. Filtering on the receiving client instead would put other
//! families' coordinates on the wire; that design is rejected.

use std::{
  collections::HashMap,
  sync::{Mutex, PoisonError},
};

use schoolrun_core::{session::ViewerSession, store::TrackingStore, visibility};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::event::TrackingEvent;

struct SessionHandle {
  session: ViewerSession,
  tx:      mpsc::UnboundedSender<TrackingEvent>,
}

/// Table of open viewer sessions.
#[derive(Default)]
pub struct SessionRegistry {
  inner: Mutex<HashMap<Uuid, SessionHandle>>,
}

impl SessionRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Open a session and hand back its id and the receiving end of its
  /// channel. Dropping the receiver is the normal disconnect path; the
  /// session is pruned on the next delivery attempt.
  pub fn register(
    &self,
    session: ViewerSession,
  ) -> (Uuid, mpsc::UnboundedReceiver<TrackingEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let session_id = Uuid::new_v4();
    self
      .lock()
      .insert(session_id, SessionHandle { session, tx });
    tracing::debug!(%session_id, "viewer session registered");
    (session_id, rx)
  }

  /// Explicit teardown; releases any buffered but undelivered events.
  pub fn unregister(&self, session_id: Uuid) {
    if self.lock().remove(&session_id).is_some() {
      tracing::debug!(%session_id, "viewer session unregistered");
    }
  }

  pub fn open_sessions(&self) -> usize {
    self.lock().len()
  }

  /// Deliver `events` to every open session the visibility resolver allows.
  ///
  /// The resolver runs per event per session, so a reassignment or
  /// guardianship change between two events is honoured immediately. A
  /// resolver failure drops that one event for that one session; closed
  /// channels are unregistered after the sweep.
  pub async fn deliver<S: TrackingStore>(&self, store: &S, events: &[TrackingEvent]) {
    // Snapshot the handles; the lock must not be held across awaits.
    let handles: Vec<(Uuid, ViewerSession, mpsc::UnboundedSender<TrackingEvent>)> = self
      .lock()
      .iter()
      .map(|(id, h)| (*id, h.session.clone(), h.tx.clone()))
      .collect();

    let mut closed = Vec::new();

    for (session_id, session, tx) in handles {
      for event in events {
        let visibility = match visibility::resolve(store, &session).await {
          Ok(v) => v,
          Err(error) => {
            tracing::warn!(%session_id, %error, "visibility lookup failed; dropping event for session");
            continue;
          }
        };

        let authorized = event
          .subjects()
          .iter()
          .all(|(kind, id)| visibility.allows(*kind, *id));
        if !authorized {
          continue;
        }

        if tx.send(event.clone()).is_err() {
          closed.push(session_id);
          break;
        }
      }
    }

    for session_id in closed {
      self.unregister(session_id);
    }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, SessionHandle>> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
