//! Viewer sessions — who is watching the live feed, and as what role.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role a viewer session acts under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Driver,
  Parent,
}

/// An open tracking view. Ephemeral: created when a client opens the feed,
/// destroyed on disconnect. Authentication happens upstream; this carries
/// only the claims the resolver needs.
///
/// `identity = None` is an authorization gap: the session is treated as
/// authorized for nothing, never as an error that disturbs other sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerSession {
  pub role:     Role,
  pub identity: Option<Uuid>,
}

impl ViewerSession {
  pub fn new(role: Role, identity: Option<Uuid>) -> Self {
    Self { role, identity }
  }
}
