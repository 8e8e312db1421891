//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, coordinates as REAL columns.

use chrono::{DateTime, Utc};
use schoolrun_core::fix::SubjectKind;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── SubjectKind ─────────────────────────────────────────────────────────────

pub fn encode_subject_kind(k: SubjectKind) -> &'static str {
  match k {
    SubjectKind::Driver => "driver",
    SubjectKind::Rider => "rider",
  }
}

pub fn decode_subject_kind(s: &str) -> Result<SubjectKind> {
  match s {
    "driver" => Ok(SubjectKind::Driver),
    "rider" => Ok(SubjectKind::Rider),
    other => Err(Error::UnknownSubjectKind(other.to_string())),
  }
}

// ─── Raw row shapes ──────────────────────────────────────────────────────────

/// A `rider_references` row before decoding into a domain type.
pub struct RawReference {
  pub rider_id:   String,
  pub driver_id:  Option<String>,
  pub latitude:   f64,
  pub longitude:  f64,
  pub address:    String,
  pub updated_at: String,
}

/// A `position_fixes` row before decoding into a domain type.
pub struct RawFix {
  pub fix_id:          String,
  pub subject_kind:    String,
  pub subject_id:      String,
  pub latitude:        f64,
  pub longitude:       f64,
  pub accuracy_meters: Option<f64>,
  pub captured_at:     String,
}
