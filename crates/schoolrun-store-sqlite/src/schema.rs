//! SQL schema for the schoolrun SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One active reference per rider; upserts replace the row in place.
CREATE TABLE IF NOT EXISTS rider_references (
    rider_id    TEXT PRIMARY KEY,
    driver_id   TEXT,            -- NULL = unassigned
    latitude    REAL NOT NULL,
    longitude   REAL NOT NULL,
    address     TEXT NOT NULL,
    updated_at  TEXT NOT NULL    -- ISO 8601 UTC; store-assigned
);

-- Position fixes are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS position_fixes (
    fix_id          TEXT PRIMARY KEY,
    subject_kind    TEXT NOT NULL,   -- 'driver' | 'rider'
    subject_id      TEXT NOT NULL,
    latitude        REAL NOT NULL,
    longitude       REAL NOT NULL,
    accuracy_meters REAL,
    captured_at     TEXT NOT NULL    -- ISO 8601 UTC; strictly increasing per subject
);

CREATE TABLE IF NOT EXISTS guardianship_edges (
    parent_id    TEXT NOT NULL,
    rider_id     TEXT NOT NULL,
    relationship TEXT NOT NULL,
    PRIMARY KEY (parent_id, rider_id)
);

CREATE INDEX IF NOT EXISTS fixes_subject_idx
    ON position_fixes(subject_id, captured_at);
CREATE INDEX IF NOT EXISTS references_driver_idx
    ON rider_references(driver_id);
CREATE INDEX IF NOT EXISTS edges_rider_idx
    ON guardianship_edges(rider_id);

PRAGMA user_version = 1;
";
