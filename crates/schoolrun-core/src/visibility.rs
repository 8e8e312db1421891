//! The visibility resolver — which subjects a viewer session may observe.
//!
//! Resolution is intentionally cheap and cache-free: fan-out re-runs it per
//! event per session, so reassignment or guardianship changes take effect on
//! the next delta rather than requiring a reconnect.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
  fix::SubjectKind,
  session::{Role, ViewerSession},
  store::TrackingStore,
};

/// The set of subjects a session is authorized to observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
  /// Admin wildcard: every driver and rider.
  All,
  /// Explicit allow-sets for everyone else.
  Subjects {
    driver_ids: HashSet<Uuid>,
    rider_ids:  HashSet<Uuid>,
  },
}

impl Visibility {
  /// Authorized for nothing. Used for sessions with no resolvable identity.
  pub fn none() -> Self {
    Self::Subjects {
      driver_ids: HashSet::new(),
      rider_ids:  HashSet::new(),
    }
  }

  pub fn allows(&self, kind: SubjectKind, id: Uuid) -> bool {
    match self {
      Self::All => true,
      Self::Subjects { driver_ids, rider_ids } => match kind {
        SubjectKind::Driver => driver_ids.contains(&id),
        SubjectKind::Rider => rider_ids.contains(&id),
      },
    }
  }
}

/// Compute the authorized subject sets for `session`.
///
/// - `admin`: the unrestricted wildcard.
/// - `driver`: themselves plus the riders currently assigned to them.
/// - `parent`: their children (via guardianship edges) plus each child's
///   currently-assigned driver.
///
/// A session with no identity resolves to [`Visibility::none`].
pub async fn resolve<S: TrackingStore>(
  store: &S,
  session: &ViewerSession,
) -> Result<Visibility, S::Error> {
  if session.role == Role::Admin {
    return Ok(Visibility::All);
  }

  let Some(identity) = session.identity else {
    return Ok(Visibility::none());
  };

  match session.role {
    Role::Admin => unreachable!("handled above"),

    Role::Driver => {
      let riders = store.assigned_riders(identity).await?;
      Ok(Visibility::Subjects {
        driver_ids: HashSet::from([identity]),
        rider_ids:  riders.into_iter().map(|r| r.rider_id).collect(),
      })
    }

    Role::Parent => {
      let children = store.children_of(identity).await?;
      let mut driver_ids = HashSet::new();
      let mut rider_ids = HashSet::new();
      for rider_id in children {
        rider_ids.insert(rider_id);
        if let Some(reference) = store.get_reference(rider_id).await?
          && let Some(driver_id) = reference.driver_id
        {
          driver_ids.insert(driver_id);
        }
      }
      Ok(Visibility::Subjects { driver_ids, rider_ids })
    }
  }
}
