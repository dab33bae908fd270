//! `SQLite` schema definitions for the relational backend.

/// SQL statement to create the parking records table.
pub const CREATE_PARKING_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS parking_records (
    id TEXT PRIMARY KEY,
    floor TEXT NOT NULL,
    number TEXT NOT NULL,
    car TEXT,
    created_at TEXT NOT NULL,
    user_id TEXT NOT NULL
)
";

/// SQL statement to create an index serving the per-owner, newest-first read.
pub const CREATE_OWNER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_parking_records_owner
    ON parking_records(user_id, created_at DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PARKING_RECORDS_TABLE,
    CREATE_OWNER_INDEX,
    CREATE_METADATA_TABLE,
];
