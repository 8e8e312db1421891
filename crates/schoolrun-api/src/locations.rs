//! Handlers for `/locations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/locations` | Body: [`SubmitFixBody`]; exactly one of `studentId`/`driverId` |
//! | `GET`  | `/locations/:kind/:subject_id/latest` | Viewer-scoped latest fix |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use schoolrun_core::{
  fix::{NewFix, PositionFix, SubjectKind},
  geo::Coordinate,
  store::TrackingStore,
  visibility,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, feed::ViewerParams};

/// JSON body accepted by `POST /locations`. Field names mirror the portal's
/// wire format; `studentId` identifies a rider subject.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFixBody {
  pub student_id: Option<Uuid>,
  pub driver_id:  Option<Uuid>,
  pub latitude:   Option<f64>,
  pub longitude:  Option<f64>,
  pub accuracy:   Option<f64>,
}

/// `POST /locations` — accept one GPS fix.
///
/// `400` on missing/out-of-range coordinates or an ambiguous subject; `500`
/// when the store is unreachable (the caller retries, we never buffer).
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SubmitFixBody>,
) -> Result<Json<PositionFix>, ApiError>
where
  S: TrackingStore + 'static,
{
  let (subject_kind, subject_id) = match (body.student_id, body.driver_id) {
    (Some(id), None) => (SubjectKind::Rider, id),
    (None, Some(id)) => (SubjectKind::Driver, id),
    _ => {
      return Err(ApiError::BadRequest(
        "exactly one of studentId/driverId is required".to_string(),
      ));
    }
  };

  let latitude = body
    .latitude
    .ok_or(ApiError::BadRequest("latitude and longitude are required".to_string()))?;
  let longitude = body
    .longitude
    .ok_or(ApiError::BadRequest("latitude and longitude are required".to_string()))?;
  let coordinate = Coordinate::new(latitude, longitude)?;

  let fix = state
    .tracker
    .submit_fix(NewFix {
      subject_kind,
      subject_id,
      coordinate,
      accuracy_meters: body.accuracy,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(fix))
}

/// `GET /locations/:kind/:subject_id/latest?role=<role>[&identity=<uuid>]`
///
/// The latest accepted fix for a subject, gated by the same visibility
/// resolver as the live feed.
pub async fn latest<S>(
  State(state): State<AppState<S>>,
  Path((subject_kind, subject_id)): Path<(SubjectKind, Uuid)>,
  Query(viewer): Query<ViewerParams>,
) -> Result<Json<PositionFix>, ApiError>
where
  S: TrackingStore + 'static,
{
  let session = viewer.into_session();
  let store = state.tracker.store().as_ref();

  let allowed = visibility::resolve(store, &session)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .allows(subject_kind, subject_id);
  if !allowed {
    return Err(ApiError::Forbidden("subject not visible to this viewer".to_string()));
  }

  let fix = store
    .latest_fix(subject_kind, subject_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("no fix recorded for {subject_id}")))?;

  Ok(Json(fix))
}
