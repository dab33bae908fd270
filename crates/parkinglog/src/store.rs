//! Vehicle-partitioned record store over a key-value medium.
//!
//! Each vehicle keeps its own list under `parking-records-<VEHICLE>`, capped
//! at the retention capacity. A merged view of every vehicle's records,
//! newest first, is rewritten under `parking-records` whenever a vehicle
//! list changes, and is what callers read back.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::record::{sort_newest_first, ParkingRecord, Vehicle};

/// Key holding the merged view of all vehicles.
pub const RECORDS_KEY: &str = "parking-records";

/// Default number of records kept per vehicle.
pub const DEFAULT_CAPACITY: usize = 10;

/// Which list of records an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The merged view across all vehicles.
    All,
    /// A single vehicle's list.
    Vehicle(Vehicle),
}

impl Scope {
    /// The key this scope is persisted under.
    #[must_use]
    pub fn key(self) -> String {
        match self {
            Self::All => RECORDS_KEY.to_string(),
            Self::Vehicle(vehicle) => format!("{RECORDS_KEY}-{vehicle}"),
        }
    }
}

impl From<Vehicle> for Scope {
    fn from(vehicle: Vehicle) -> Self {
        Self::Vehicle(vehicle)
    }
}

/// Record store partitioned by vehicle.
#[derive(Debug)]
pub struct RecordStore<K> {
    kv: K,
    capacity: usize,
}

impl<K: KeyValueStore> RecordStore<K> {
    /// Create a store keeping [`DEFAULT_CAPACITY`] records per vehicle.
    pub fn new(kv: K) -> Self {
        Self::with_capacity(kv, DEFAULT_CAPACITY)
    }

    /// Create a store keeping `capacity` records per vehicle.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_capacity(kv: K, capacity: usize) -> Self {
        Self {
            kv,
            capacity: capacity.max(1),
        }
    }

    /// Records kept per vehicle.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The underlying key-value store.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Load the records persisted for a scope.
    ///
    /// Never fails: a missing key, unreadable medium or malformed content all
    /// yield an empty list, the latter two with a warning.
    pub fn load(&self, scope: Scope) -> Vec<ParkingRecord> {
        let key = scope.key();
        let raw = match self.kv.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to parse saved records under {}: {}", key, e);
                Vec::new()
            }
        }
    }

    /// Overwrite the records persisted for a scope.
    ///
    /// Saving a vehicle scope also rebuilds the merged view from every
    /// vehicle's list. Merged entries that no vehicle list tracks, such as
    /// records written before lists were kept per vehicle, are carried over.
    /// Unchanged content is not rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the key-value access fails.
    pub fn save(&self, records: &[ParkingRecord], scope: Scope) -> Result<()> {
        let Scope::Vehicle(saved) = scope else {
            return self.write(&scope.key(), records);
        };

        let mut tracked: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
        let mut merged = Vec::new();
        for vehicle in Vehicle::ALL {
            let previous = self.load(Scope::Vehicle(vehicle));
            tracked.extend(previous.iter().map(|r| r.id.clone()));
            if vehicle == saved {
                merged.extend_from_slice(records);
            } else {
                merged.extend(previous);
            }
        }

        let untracked: Vec<_> = self
            .load(Scope::All)
            .into_iter()
            .filter(|r| !tracked.contains(&r.id))
            .collect();
        if !untracked.is_empty() {
            debug!("Keeping {} untracked record(s) in {}", untracked.len(), RECORDS_KEY);
        }
        merged.extend(untracked);
        sort_newest_first(&mut merged);

        self.write(&scope.key(), records)?;
        self.write(RECORDS_KEY, &merged)
    }

    /// Persist a list under a key, skipping the write when nothing would
    /// change. An empty list removes the key.
    fn write(&self, key: &str, records: &[ParkingRecord]) -> Result<()> {
        let value = serde_json::to_string(records)?;
        match self.kv.get(key)? {
            Some(existing) if existing == value => Ok(()),
            None if records.is_empty() => Ok(()),
            _ if records.is_empty() => self.kv.remove(key),
            _ => self.kv.set(key, &value),
        }
    }

    /// Prepend a record to its vehicle's list, evicting the oldest beyond capacity.
    ///
    /// Returns the merged view after the write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingScope`] without writing if the record has no
    /// vehicle, or an error if persisting fails.
    pub fn add(&self, record: ParkingRecord) -> Result<Vec<ParkingRecord>> {
        let Some(vehicle) = record.car else {
            return Err(Error::missing_scope(record.id));
        };
        let scope = Scope::Vehicle(vehicle);

        let mut records = self.load(scope);
        records.insert(0, record);
        if records.len() > self.capacity {
            let evicted = records.len() - self.capacity;
            records.truncate(self.capacity);
            debug!("Evicted {} record(s) from {}", evicted, scope.key());
        }

        self.save(&records, scope)?;
        Ok(self.load(Scope::All))
    }

    /// Remove a record by id.
    ///
    /// The owning vehicle is found by scanning the merged view. A record that
    /// its vehicle's list doesn't hold, or that has no vehicle, is removed from
    /// the merged view directly. An unknown id leaves everything untouched.
    /// Returns the merged view after the write.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn delete(&self, id: &str) -> Result<Vec<ParkingRecord>> {
        let merged = self.load(Scope::All);
        let Some(found) = merged.iter().find(|r| r.id == id) else {
            debug!("No record with id {} to delete", id);
            return Ok(merged);
        };

        if let Some(vehicle) = found.car {
            let scope = Scope::Vehicle(vehicle);
            let mut records = self.load(scope);
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() < before {
                self.save(&records, scope)?;
                return Ok(self.load(Scope::All));
            }
        }

        let remaining: Vec<_> = merged.iter().filter(|r| r.id != id).cloned().collect();
        self.save(&remaining, Scope::All)?;
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};

    use super::*;
    use crate::kv::MemoryKv;
    use crate::logging::init_test_logging;
    use crate::record::Floor;

    fn base_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn record(id: &str, car: Option<Vehicle>, minutes: i64) -> ParkingRecord {
        ParkingRecord {
            id: id.to_string(),
            floor: Floor::B1,
            number: "12".to_string(),
            created_at: base_time() + Duration::minutes(minutes),
            car,
        }
    }

    fn create_test_store() -> RecordStore<MemoryKv> {
        init_test_logging();
        RecordStore::new(MemoryKv::new())
    }

    fn ids(records: &[ParkingRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_scope_keys() {
        assert_eq!(Scope::All.key(), "parking-records");
        assert_eq!(Scope::Vehicle(Vehicle::G80).key(), "parking-records-G80");
        assert_eq!(Scope::from(Vehicle::G90).key(), "parking-records-G90");
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let store = RecordStore::with_capacity(MemoryKv::new(), 0);
        assert_eq!(store.capacity(), 1);
    }

    #[test]
    fn test_load_empty() {
        let store = create_test_store();
        assert!(store.load(Scope::All).is_empty());
        assert!(store.load(Scope::Vehicle(Vehicle::G80)).is_empty());
    }

    #[test]
    fn test_load_malformed_returns_empty() {
        let store = create_test_store();
        store.kv().set("parking-records-G80", "{not json").unwrap();
        assert!(store.load(Scope::Vehicle(Vehicle::G80)).is_empty());
    }

    #[test]
    fn test_add_single_record() {
        let store = create_test_store();
        let merged = store
            .add(record("a", Some(Vehicle::G80), 0))
            .unwrap();

        assert_eq!(merged.len(), 1);
        let loaded = store.load(Scope::All);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].number, "12");
        assert_eq!(loaded[0].floor, Floor::B1);
    }

    #[test]
    fn test_add_without_vehicle_writes_nothing() {
        let store = create_test_store();
        let result = store.add(record("a", None, 0));

        assert!(matches!(result, Err(Error::MissingScope { id }) if id == "a"));
        assert!(store.kv().is_empty());
    }

    #[test]
    fn test_add_evicts_oldest() {
        let store = create_test_store();
        for i in 0..10 {
            store
                .add(record(&format!("r{i}"), Some(Vehicle::G80), i))
                .unwrap();
        }
        store.add(record("r10", Some(Vehicle::G80), 10)).unwrap();

        let g80 = store.load(Scope::Vehicle(Vehicle::G80));
        assert_eq!(g80.len(), 10);
        assert!(g80.iter().all(|r| r.id != "r0"));
        assert_eq!(g80[0].id, "r10");
    }

    #[test]
    fn test_capacity_is_per_vehicle() {
        let store = RecordStore::with_capacity(MemoryKv::new(), 2);
        for i in 0..3 {
            store
                .add(record(&format!("a{i}"), Some(Vehicle::G80), i))
                .unwrap();
            store
                .add(record(&format!("b{i}"), Some(Vehicle::G90), i))
                .unwrap();
        }

        assert_eq!(store.load(Scope::Vehicle(Vehicle::G80)).len(), 2);
        assert_eq!(store.load(Scope::Vehicle(Vehicle::G90)).len(), 2);
        assert_eq!(store.load(Scope::All).len(), 4);
    }

    #[test]
    fn test_merged_view_sorted_newest_first() {
        let store = create_test_store();
        store.add(record("old", Some(Vehicle::G80), 0)).unwrap();
        store.add(record("mid", Some(Vehicle::G90), 5)).unwrap();
        store.add(record("new", Some(Vehicle::G80), 10)).unwrap();

        let ids: Vec<_> = store
            .load(Scope::All)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_delete_removes_from_vehicle_scope() {
        let store = create_test_store();
        store.add(record("a", Some(Vehicle::G80), 0)).unwrap();
        store.add(record("b", Some(Vehicle::G90), 1)).unwrap();

        let merged = store.delete("a").unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "b");
        assert!(store.load(Scope::Vehicle(Vehicle::G80)).is_empty());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let store = create_test_store();
        store.add(record("a", Some(Vehicle::G80), 0)).unwrap();
        let before_all = store.kv().get(RECORDS_KEY).unwrap();
        let before_g80 = store.kv().get("parking-records-G80").unwrap();

        let merged = store.delete("zzz").unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(store.kv().get(RECORDS_KEY).unwrap(), before_all);
        assert_eq!(store.kv().get("parking-records-G80").unwrap(), before_g80);
    }

    #[test]
    fn test_delete_record_without_vehicle() {
        let store = create_test_store();
        let legacy = vec![record("x", None, 0), record("y", None, 1)];
        store.save(&legacy, Scope::All).unwrap();

        let merged = store.delete("x").unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "y");
    }

    #[test]
    fn test_load_then_save_is_idempotent() {
        let store = create_test_store();
        store.add(record("a", Some(Vehicle::G80), 0)).unwrap();
        store.add(record("b", Some(Vehicle::G90), 1)).unwrap();
        let before_all = store.kv().get(RECORDS_KEY).unwrap();
        let before_g80 = store.kv().get("parking-records-G80").unwrap();

        let g80 = store.load(Scope::Vehicle(Vehicle::G80));
        store.save(&g80, Scope::Vehicle(Vehicle::G80)).unwrap();

        assert_eq!(store.kv().get(RECORDS_KEY).unwrap(), before_all);
        assert_eq!(store.kv().get("parking-records-G80").unwrap(), before_g80);
    }

    #[test]
    fn test_add_then_delete_restores_state() {
        let store = create_test_store();
        store.add(record("a", Some(Vehicle::G80), 0)).unwrap();
        store.add(record("b", Some(Vehicle::G90), 1)).unwrap();
        let before = store.load(Scope::All);

        store.add(record("c", Some(Vehicle::G80), 2)).unwrap();
        let after = store.delete("c").unwrap();

        assert_eq!(after, before);
    }

    #[test]
    fn test_delete_record_only_in_merged_view() {
        let store = create_test_store();
        let merged = vec![
            record("c", Some(Vehicle::G80), 2),
            record("b", Some(Vehicle::G90), 1),
            record("a", Some(Vehicle::G80), 0),
        ];
        store.save(&merged, Scope::All).unwrap();

        let after = store.delete("a").unwrap();

        assert_eq!(ids(&after), vec!["c", "b"]);
        assert_eq!(ids(&store.load(Scope::All)), vec!["c", "b"]);
        assert!(store.kv().get("parking-records-G80").unwrap().is_none());
    }

    #[test]
    fn test_add_keeps_records_without_vehicle() {
        let store = create_test_store();
        let legacy = vec![record("y", None, 1), record("x", None, 0)];
        store.save(&legacy, Scope::All).unwrap();

        let merged = store.add(record("n", Some(Vehicle::G80), 10)).unwrap();
        assert_eq!(ids(&merged), vec!["n", "y", "x"]);

        let merged = store.delete("n").unwrap();
        assert_eq!(merged, legacy);
    }

    #[test]
    fn test_add_keeps_untracked_records_with_vehicle() {
        let store = create_test_store();
        store
            .save(&[record("old", Some(Vehicle::G80), 0)], Scope::All)
            .unwrap();

        let merged = store.add(record("new", Some(Vehicle::G80), 5)).unwrap();
        assert_eq!(ids(&merged), vec!["new", "old"]);

        let merged = store.delete("old").unwrap();
        assert_eq!(ids(&merged), vec!["new"]);
        assert_eq!(ids(&store.load(Scope::Vehicle(Vehicle::G80))), vec!["new"]);
    }

    #[test]
    fn test_load_then_save_on_empty_store_writes_nothing() {
        let store = create_test_store();

        let g80 = store.load(Scope::Vehicle(Vehicle::G80));
        store.save(&g80, Scope::Vehicle(Vehicle::G80)).unwrap();

        assert!(store.kv().is_empty());
    }

    #[test]
    fn test_delete_last_record_removes_keys() {
        let store = create_test_store();
        store.add(record("a", Some(Vehicle::G80), 0)).unwrap();

        assert!(store.delete("a").unwrap().is_empty());
        assert!(store.kv().is_empty());
    }
}
