//! Handler for `POST /guardians` — the enrollment-workflow shim that records
//! parent↔rider edges, so the visibility resolver can be exercised end to
//! end without the external admin portal.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use schoolrun_core::{guardianship::GuardianshipEdge, store::TrackingStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEdgeBody {
  pub parent_id:    Uuid,
  pub rider_id:     Uuid,
  pub relationship: String,
}

/// `POST /guardians` — returns 201; idempotent per `(parent, rider)`.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreateEdgeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TrackingStore + 'static,
{
  state
    .tracker
    .store()
    .add_guardian(GuardianshipEdge {
      parent_id:    body.parent_id,
      rider_id:     body.rider_id,
      relationship: body.relationship,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::CREATED)
}
