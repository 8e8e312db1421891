//! [`SqliteStore`] — the SQLite implementation of [`TrackingStore`].

use std::path::Path;

use chrono::{Duration, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use schoolrun_core::{
  fix::{NewFix, PositionFix, SubjectKind},
  geo::Coordinate,
  guardianship::GuardianshipEdge,
  reference::{NewReference, RiderReference},
  store::TrackingStore,
};

use crate::{
  Error, Result,
  encode::{
    RawFix, RawReference, decode_dt, decode_opt_uuid, decode_subject_kind,
    decode_uuid, encode_dt, encode_subject_kind, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A schoolrun tracking store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls go
/// through one connection, so each store call sees a consistent snapshot.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row decoding ────────────────────────────────────────────────────────────

fn decode_reference(raw: RawReference) -> Result<RiderReference> {
  Ok(RiderReference {
    rider_id:   decode_uuid(&raw.rider_id)?,
    driver_id:  decode_opt_uuid(raw.driver_id.as_deref())?,
    coordinate: Coordinate {
      latitude:  raw.latitude,
      longitude: raw.longitude,
    },
    address:    raw.address,
    updated_at: decode_dt(&raw.updated_at)?,
  })
}

fn decode_fix(raw: RawFix) -> Result<PositionFix> {
  Ok(PositionFix {
    fix_id:          decode_uuid(&raw.fix_id)?,
    subject_kind:    decode_subject_kind(&raw.subject_kind)?,
    subject_id:      decode_uuid(&raw.subject_id)?,
    coordinate:      Coordinate {
      latitude:  raw.latitude,
      longitude: raw.longitude,
    },
    accuracy_meters: raw.accuracy_meters,
    captured_at:     decode_dt(&raw.captured_at)?,
  })
}

fn reference_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReference> {
  Ok(RawReference {
    rider_id:   row.get(0)?,
    driver_id:  row.get(1)?,
    latitude:   row.get(2)?,
    longitude:  row.get(3)?,
    address:    row.get(4)?,
    updated_at: row.get(5)?,
  })
}

const REFERENCE_COLUMNS: &str =
  "rider_id, driver_id, latitude, longitude, address, updated_at";

// ─── TrackingStore impl ──────────────────────────────────────────────────────

impl TrackingStore for SqliteStore {
  type Error = Error;

  // ── Reference registry ────────────────────────────────────────────────────

  async fn upsert_reference(&self, input: NewReference) -> Result<RiderReference> {
    let updated_at = Utc::now();

    let rider_str  = encode_uuid(input.rider_id);
    let driver_str = input.driver_id.map(encode_uuid);
    let at_str     = encode_dt(updated_at);
    let latitude   = input.coordinate.latitude;
    let longitude  = input.coordinate.longitude;
    let address    = input.address.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO rider_references
             (rider_id, driver_id, latitude, longitude, address, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(rider_id) DO UPDATE SET
             driver_id  = excluded.driver_id,
             latitude   = excluded.latitude,
             longitude  = excluded.longitude,
             address    = excluded.address,
             updated_at = excluded.updated_at",
          rusqlite::params![rider_str, driver_str, latitude, longitude, address, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(RiderReference {
      rider_id:   input.rider_id,
      driver_id:  input.driver_id,
      coordinate: input.coordinate,
      address:    input.address,
      updated_at,
    })
  }

  async fn get_reference(&self, rider_id: Uuid) -> Result<Option<RiderReference>> {
    let id_str = encode_uuid(rider_id);

    let raw: Option<RawReference> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!(
              "SELECT {REFERENCE_COLUMNS} FROM rider_references WHERE rider_id = ?1"
            ),
            rusqlite::params![id_str],
            reference_from_row,
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(decode_reference).transpose()
  }

  async fn assigned_riders(&self, driver_id: Uuid) -> Result<Vec<RiderReference>> {
    let id_str = encode_uuid(driver_id);

    let raws: Vec<RawReference> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REFERENCE_COLUMNS} FROM rider_references
           WHERE driver_id = ?1
           ORDER BY rider_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], reference_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(decode_reference).collect()
  }

  // ── Position fixes ────────────────────────────────────────────────────────

  async fn insert_fix(&self, input: NewFix) -> Result<PositionFix> {
    let fix_id = Uuid::new_v4();

    let fix_str    = encode_uuid(fix_id);
    let kind_str   = encode_subject_kind(input.subject_kind).to_owned();
    let subj_str   = encode_uuid(input.subject_id);
    let latitude   = input.coordinate.latitude;
    let longitude  = input.coordinate.longitude;
    let accuracy   = input.accuracy_meters;

    // captured_at must strictly increase per subject in acceptance order.
    // A device clock standing still (or stepping backwards) is nudged one
    // millisecond past the previous fix.
    let captured_str: String = self
      .conn
      .call(move |conn| {
        let previous: Option<String> = conn
          .query_row(
            "SELECT captured_at FROM position_fixes
             WHERE subject_id = ?1
             ORDER BY captured_at DESC
             LIMIT 1",
            rusqlite::params![subj_str],
            |r| r.get(0),
          )
          .optional()?;

        let mut captured_at = Utc::now();
        if let Some(prev) = previous
          && let Ok(prev_dt) = chrono::DateTime::parse_from_rfc3339(&prev)
        {
          let floor = prev_dt.with_timezone(&Utc) + Duration::milliseconds(1);
          if captured_at < floor {
            captured_at = floor;
          }
        }
        let at_str = encode_dt(captured_at);

        conn.execute(
          "INSERT INTO position_fixes
             (fix_id, subject_kind, subject_id, latitude, longitude, accuracy_meters, captured_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            fix_str, kind_str, subj_str, latitude, longitude, accuracy, at_str
          ],
        )?;
        Ok(at_str)
      })
      .await?;

    Ok(PositionFix {
      fix_id,
      subject_kind:    input.subject_kind,
      subject_id:      input.subject_id,
      coordinate:      input.coordinate,
      accuracy_meters: input.accuracy_meters,
      captured_at:     decode_dt(&captured_str)?,
    })
  }

  async fn latest_fix(
    &self,
    subject_kind: SubjectKind,
    subject_id: Uuid,
  ) -> Result<Option<PositionFix>> {
    let kind_str = encode_subject_kind(subject_kind).to_owned();
    let subj_str = encode_uuid(subject_id);

    let raw: Option<RawFix> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT fix_id, subject_kind, subject_id, latitude, longitude,
                    accuracy_meters, captured_at
             FROM position_fixes
             WHERE subject_kind = ?1 AND subject_id = ?2
             ORDER BY captured_at DESC
             LIMIT 1",
            rusqlite::params![kind_str, subj_str],
            |row| {
              Ok(RawFix {
                fix_id:          row.get(0)?,
                subject_kind:    row.get(1)?,
                subject_id:      row.get(2)?,
                latitude:        row.get(3)?,
                longitude:       row.get(4)?,
                accuracy_meters: row.get(5)?,
                captured_at:     row.get(6)?,
              })
            },
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(decode_fix).transpose()
  }

  // ── Guardianship ──────────────────────────────────────────────────────────

  async fn add_guardian(&self, edge: GuardianshipEdge) -> Result<()> {
    let parent_str   = encode_uuid(edge.parent_id);
    let rider_str    = encode_uuid(edge.rider_id);
    let relationship = edge.relationship;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO guardianship_edges (parent_id, rider_id, relationship)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(parent_id, rider_id) DO UPDATE SET
             relationship = excluded.relationship",
          rusqlite::params![parent_str, rider_str, relationship],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn children_of(&self, parent_id: Uuid) -> Result<Vec<Uuid>> {
    let parent_str = encode_uuid(parent_id);

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT rider_id FROM guardianship_edges
           WHERE parent_id = ?1
           ORDER BY rider_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![parent_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }
}
