//! SQL schema for the demarc SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per stored layer, keyed by (date, class).
-- Layers are immutable after write; an overwrite replaces the whole row.
CREATE TABLE IF NOT EXISTS layers (
    date           TEXT NOT NULL,    -- ISO 8601 calendar date
    class          TEXT NOT NULL,    -- 'occupied' | 'gray' | 'contested'
    regions_json   TEXT NOT NULL,    -- canonical Region list as JSON
    features_count INTEGER NOT NULL, -- number of regions in regions_json
    checksum       TEXT NOT NULL,    -- sha256 hex of regions_json
    created_at     TEXT NOT NULL,    -- ISO 8601 UTC; server-assigned
    PRIMARY KEY (date, class)
);

-- Cache of rendered report text. Never the source of truth: reports are
-- always reproducible from the layers table.
CREATE TABLE IF NOT EXISTS reports (
    report_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    date       TEXT NOT NULL,
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS layers_class_date_idx ON layers(class, date);
CREATE INDEX IF NOT EXISTS reports_date_idx      ON reports(date);

PRAGMA user_version = 1;
";
