//! Handlers for the reference registry endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/references/:rider_id` | Upsert pickup coordinate + assignment |
//! | `GET`  | `/references/:rider_id` | 404 if absent |
//! | `GET`  | `/references?driverId=<id>` | Riders assigned to a driver |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use schoolrun_core::{
  geo::Coordinate,
  reference::{NewReference, RiderReference},
  store::TrackingStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// JSON body accepted by `PUT /references/:rider_id`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertReferenceBody {
  pub driver_id: Option<Uuid>,
  pub latitude:  f64,
  pub longitude: f64,
  pub address:   String,
}

/// `PUT /references/:rider_id` — create or replace a rider's reference.
/// The upsert is announced to all open feed sessions.
pub async fn upsert<S>(
  State(state): State<AppState<S>>,
  Path(rider_id): Path<Uuid>,
  Json(body): Json<UpsertReferenceBody>,
) -> Result<Json<RiderReference>, ApiError>
where
  S: TrackingStore + 'static,
{
  let coordinate = Coordinate::new(body.latitude, body.longitude)?;

  let reference = state
    .tracker
    .upsert_reference(NewReference {
      rider_id,
      driver_id: body.driver_id,
      coordinate,
      address: body.address,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(reference))
}

/// `GET /references/:rider_id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(rider_id): Path<Uuid>,
) -> Result<Json<RiderReference>, ApiError>
where
  S: TrackingStore + 'static,
{
  let reference = state
    .tracker
    .store()
    .get_reference(rider_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("rider reference {rider_id} not found")))?;
  Ok(Json(reference))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedParams {
  pub driver_id: Uuid,
}

/// `GET /references?driverId=<id>` — every rider assigned to a driver.
pub async fn assigned<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<AssignedParams>,
) -> Result<Json<Vec<RiderReference>>, ApiError>
where
  S: TrackingStore + 'static,
{
  let references = state
    .tracker
    .store()
    .assigned_riders(params.driver_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(references))
}
