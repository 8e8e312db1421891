//! The `TrackingStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `schoolrun-store-sqlite`). Higher layers (`schoolrun-live`,
//! `schoolrun-api`) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  fix::{NewFix, PositionFix, SubjectKind},
  guardianship::GuardianshipEdge,
  reference::{NewReference, RiderReference},
};

/// Abstraction over a schoolrun storage backend.
///
/// Position fixes are strictly append-only; rider references are upserted in
/// place (one active row per rider). All methods return `Send` futures so the
/// trait can be used in multi-threaded async runtimes (tokio with `axum`).
pub trait TrackingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reference registry ────────────────────────────────────────────────

  /// Create or replace a rider's reference location and driver assignment.
  /// Coordinates are already validated by [`crate::geo::Coordinate::new`].
  fn upsert_reference(
    &self,
    input: NewReference,
  ) -> impl Future<Output = Result<RiderReference, Self::Error>> + Send + '_;

  /// Retrieve a rider's reference. Returns `None` if not found.
  fn get_reference(
    &self,
    rider_id: Uuid,
  ) -> impl Future<Output = Result<Option<RiderReference>, Self::Error>> + Send + '_;

  /// All references currently assigned to `driver_id`.
  fn assigned_riders(
    &self,
    driver_id: Uuid,
  ) -> impl Future<Output = Result<Vec<RiderReference>, Self::Error>> + Send + '_;

  // ── Position fixes — append-only writes ───────────────────────────────

  /// Accept a fix. The store assigns `fix_id` and `captured_at`, keeping
  /// `captured_at` strictly increasing per subject in acceptance order.
  fn insert_fix(
    &self,
    input: NewFix,
  ) -> impl Future<Output = Result<PositionFix, Self::Error>> + Send + '_;

  /// The most recently accepted fix for a subject, if any.
  fn latest_fix(
    &self,
    subject_kind: SubjectKind,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Option<PositionFix>, Self::Error>> + Send + '_;

  // ── Guardianship ──────────────────────────────────────────────────────

  /// Record a parent↔rider edge. Idempotent per `(parent_id, rider_id)`.
  fn add_guardian(
    &self,
    edge: GuardianshipEdge,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Rider ids reachable from `parent_id` through guardianship edges.
  fn children_of(
    &self,
    parent_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;
}
