//! SQL schema for the StudyPal SQLite gateway.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per logical key; `value` holds the encoded collection.
CREATE TABLE IF NOT EXISTS entries (
    key         TEXT PRIMARY KEY,   -- e.g. 'studypal_documents'
    value       BLOB NOT NULL,
    updated_at  TEXT NOT NULL       -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
