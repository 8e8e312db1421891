//! The live feed endpoint — the per-viewer SSE subscription.
//!
//! Authentication happens upstream; the query parameters carry the viewer's
//! claims and this layer applies authorization on every delivered event.
//! Disconnecting drops the stream, which drops the session's receiver; the
//! registry prunes the dead channel on the next delivery, so nothing leaks.
//! Re-subscribing starts from scratch — visibility is never carried over.

use std::convert::Infallible;

use axum::{
  extract::{Query, State},
  response::sse::{Event, KeepAlive, Sse},
};
use schoolrun_core::{
  session::{Role, ViewerSession},
  store::TrackingStore,
};
use serde::Deserialize;
use tokio_stream::{Stream, StreamExt as _, wrappers::UnboundedReceiverStream};
use uuid::Uuid;

use crate::AppState;

/// Viewer claims, as set by the upstream auth proxy.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ViewerParams {
  pub role:     Role,
  pub identity: Option<Uuid>,
}

impl ViewerParams {
  pub fn into_session(self) -> ViewerSession {
    ViewerSession::new(self.role, self.identity)
  }
}

/// `GET /feed?role=<role>[&identity=<uuid>]`
///
/// Streams `fix`, `proximity`, and `reference` events as
/// `text/event-stream`, each already filtered through the visibility
/// resolver for this session.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(viewer): Query<ViewerParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
  S: TrackingStore + 'static,
{
  let (session_id, rx) = state.tracker.subscribe(viewer.into_session());
  tracing::info!(%session_id, role = ?viewer.role, "live feed opened");

  let stream = UnboundedReceiverStream::new(rx).map(|event| {
    let payload = match event.payload_json() {
      Ok(json) => json,
      Err(error) => {
        tracing::warn!(%error, "failed to serialise event payload");
        "{}".to_string()
      }
    };
    Ok(Event::default().event(event.name()).data(payload))
  });

  Sse::new(stream).keep_alive(KeepAlive::default())
}
