//! Relational backend for parking records.
//!
//! This module provides `SQLite`-based storage where every row carries the
//! owning user's identity, and every read and write is filtered by it.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::{Floor, ParkingRecord, Vehicle};
use crate::store::DEFAULT_CAPACITY;

/// Columns of a parking record row as stored.
type RawRow = (String, String, String, Option<String>, String);

/// Parking records database.
///
/// Reads return an owner's most recent records, newest first, limited to the
/// retention capacity. Rows with equal timestamps order by insertion, latest
/// first. Inserts prune the owner's rows back down to that
/// capacity.
#[derive(Debug)]
pub struct Database {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
    /// Records kept per owner.
    capacity: usize,
}

impl Database {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn,
            capacity: DEFAULT_CAPACITY,
        })
    }

    /// Create an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
            capacity: DEFAULT_CAPACITY,
        })
    }

    /// Set the number of records kept per owner. Zero is treated as one.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Records kept per owner.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get an owner's most recent records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row holds an unknown floor or vehicle.
    pub fn fetch(&self, owner: &str) -> Result<Vec<ParkingRecord>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, floor, number, car, created_at
            FROM parking_records WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC LIMIT ?2
            ",
        )?;

        let limit = i64::try_from(self.capacity).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![owner, limit], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<std::result::Result<Vec<RawRow>, _>>()?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    /// Insert a record for an owner, then prune the owner's oldest rows beyond capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including when the id already exists.
    pub fn insert(&self, record: &ParkingRecord, owner: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO parking_records (id, floor, number, car, created_at, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                record.id,
                record.floor.as_str(),
                record.number,
                record.car.map(Vehicle::as_str),
                format_timestamp(record.created_at),
                owner,
            ],
        )?;
        debug!("Inserted record {} for owner {}", record.id, owner);

        self.prune_keep_recent(owner, self.capacity)?;
        Ok(())
    }

    /// Delete an owner's record by id.
    ///
    /// Returns `true` if a record was deleted, `false` if the owner has no such record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: &str, owner: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM parking_records WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;
        Ok(affected > 0)
    }

    /// Count an owner's records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, owner: &str) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM parking_records WHERE user_id = ?1",
            [owner],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Prune an owner's records to keep only the most recent N entries.
    ///
    /// Returns the number of records deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_keep_recent(&self, owner: &str, keep_count: usize) -> Result<usize> {
        let keep_i64 = i64::try_from(keep_count).unwrap_or(i64::MAX);
        let affected = self.conn.execute(
            r"
            DELETE FROM parking_records WHERE user_id = ?1 AND id NOT IN (
                SELECT id FROM parking_records WHERE user_id = ?1
                ORDER BY created_at DESC, rowid DESC LIMIT ?2
            )
            ",
            params![owner, keep_i64],
        )?;

        if affected > 0 {
            info!("Pruned {} records to keep {} recent", affected, keep_count);
        }
        Ok(affected)
    }

    /// Convert stored columns to a record.
    fn row_to_record((id, floor, number, car, created_at): RawRow) -> Result<ParkingRecord> {
        let floor: Floor = floor.parse()?;
        let car = car.map(|c| c.parse::<Vehicle>()).transpose()?;

        let created_at = DateTime::parse_from_rfc3339(&created_at).map_or_else(
            |_| {
                warn!("Unparseable timestamp on record {}: {}", id, created_at);
                Utc::now()
            },
            |dt| dt.with_timezone(&Utc),
        );

        Ok(ParkingRecord {
            id,
            floor,
            number,
            created_at,
            car,
        })
    }
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
