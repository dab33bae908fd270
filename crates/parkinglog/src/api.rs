//! Record access façade.
//!
//! [`RecordBackend`] is implemented by both persistence strategies: the
//! vehicle-partitioned [`RecordStore`] and the owner-scoped [`Database`].
//! One is chosen at startup; [`ParkingApi`] sits in front of it, stamps new
//! records with their creation time and passes failures through untouched.

use chrono::Utc;
use tracing::debug;

use crate::database::Database;
use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::record::{NewRecord, ParkingRecord};
use crate::store::{RecordStore, Scope};

/// A place parking records can be fetched from, added to and deleted from.
pub trait RecordBackend {
    /// Get the owner's records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn fetch_records(&self, owner: &str) -> Result<Vec<ParkingRecord>>;

    /// Persist a new record for the owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    fn add_record(&self, record: ParkingRecord, owner: &str) -> Result<()>;

    /// Delete one of the owner's records. Unknown ids are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn delete_record(&self, id: &str, owner: &str) -> Result<()>;
}

/// Key-value records are not owned by anyone; the owner is ignored.
impl<K: KeyValueStore> RecordBackend for RecordStore<K> {
    fn fetch_records(&self, _owner: &str) -> Result<Vec<ParkingRecord>> {
        Ok(self.load(Scope::All))
    }

    fn add_record(&self, record: ParkingRecord, _owner: &str) -> Result<()> {
        self.add(record).map(|_| ())
    }

    fn delete_record(&self, id: &str, _owner: &str) -> Result<()> {
        self.delete(id).map(|_| ())
    }
}

impl RecordBackend for Database {
    fn fetch_records(&self, owner: &str) -> Result<Vec<ParkingRecord>> {
        self.fetch(owner)
    }

    fn add_record(&self, record: ParkingRecord, owner: &str) -> Result<()> {
        self.insert(&record, owner)
    }

    fn delete_record(&self, id: &str, owner: &str) -> Result<()> {
        self.delete(id, owner).map(|_| ())
    }
}

impl<B: RecordBackend + ?Sized> RecordBackend for Box<B> {
    fn fetch_records(&self, owner: &str) -> Result<Vec<ParkingRecord>> {
        (**self).fetch_records(owner)
    }

    fn add_record(&self, record: ParkingRecord, owner: &str) -> Result<()> {
        (**self).add_record(record, owner)
    }

    fn delete_record(&self, id: &str, owner: &str) -> Result<()> {
        (**self).delete_record(id, owner)
    }
}

/// Thin access layer over a [`RecordBackend`].
#[derive(Debug)]
pub struct ParkingApi<B> {
    backend: B,
}

impl<B: RecordBackend> ParkingApi<B> {
    /// Wrap a backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetch the owner's records, newest first.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn fetch(&self, owner: &str) -> Result<Vec<ParkingRecord>> {
        self.backend.fetch_records(owner)
    }

    /// Stamp a new record with the current time and store it.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn add(&self, record: NewRecord, owner: &str) -> Result<ParkingRecord> {
        let record = record.into_record(Utc::now());
        debug!("Adding record {} ({}{})", record.id, record.floor, record.number);
        self.backend.add_record(record.clone(), owner)?;
        Ok(record)
    }

    /// Delete one of the owner's records.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub fn delete(&self, id: &str, owner: &str) -> Result<()> {
        debug!("Deleting record {}", id);
        self.backend.delete_record(id, owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::kv::MemoryKv;
    use crate::record::{Floor, Vehicle};

    fn new_record(number: &str, car: Option<Vehicle>) -> NewRecord {
        NewRecord::new(Floor::B1, number, car).unwrap()
    }

    #[test]
    fn test_store_backend_ignores_owner() {
        let api = ParkingApi::new(RecordStore::new(MemoryKv::new()));
        api.add(new_record("12", Some(Vehicle::G80)), "alice").unwrap();

        assert_eq!(api.fetch("bob").unwrap().len(), 1);
    }

    #[test]
    fn test_database_backend_scopes_by_owner() {
        let api = ParkingApi::new(Database::open_in_memory().unwrap());
        let saved = api.add(new_record("12", Some(Vehicle::G80)), "alice").unwrap();

        assert!(api.fetch("bob").unwrap().is_empty());
        api.delete(&saved.id, "bob").unwrap();
        assert_eq!(api.fetch("alice").unwrap().len(), 1);
        api.delete(&saved.id, "alice").unwrap();
        assert!(api.fetch("alice").unwrap().is_empty());
    }

    #[test]
    fn test_add_stamps_created_at() {
        let api = ParkingApi::new(RecordStore::new(MemoryKv::new()));
        let before = Utc::now();
        let saved = api.add(new_record("7", Some(Vehicle::G90)), "u").unwrap();

        assert!(saved.created_at >= before);
        assert_eq!(api.fetch("u").unwrap()[0], saved);
    }

    #[test]
    fn test_store_errors_propagate() {
        let api = ParkingApi::new(RecordStore::new(MemoryKv::new()));
        let err = api.add(new_record("7", None), "u").unwrap_err();
        assert!(matches!(err, Error::MissingScope { .. }));
    }

    #[test]
    fn test_boxed_backend() {
        let backend: Box<dyn RecordBackend> = Box::new(RecordStore::new(MemoryKv::new()));
        let api = ParkingApi::new(backend);
        api.add(new_record("1", Some(Vehicle::G80)), "u").unwrap();
        assert_eq!(api.fetch("u").unwrap().len(), 1);
    }
}
