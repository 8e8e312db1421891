//! Guardianship edges — the authorization link between a parent and a rider.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One parent↔rider relationship. Many-to-many: a rider may have any number
/// of guardians and a parent any number of riders.
///
/// Edges are created by the enrollment workflow; the visibility resolver
/// reads them on every delivery, so adding or removing an edge takes effect
/// on the next delta without a session restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianshipEdge {
  pub parent_id:    Uuid,
  pub rider_id:     Uuid,
  /// Free-text label, e.g. "mother", "legal guardian".
  pub relationship: String,
}
