//! View session over the record access layer.
//!
//! A [`Session`] starts out loading, becomes ready once the first fetch
//! resolves, and drops back to loading for every save or delete. Every
//! mutation is followed by a full re-fetch; nothing is updated optimistically.

use tracing::{debug, warn};

use crate::api::{ParkingApi, RecordBackend};
use crate::error::Result;
use crate::record::{Floor, NewRecord, ParkingRecord, Vehicle, MAX_SLOT_DIGITS};

/// Message shown when the initial or follow-up fetch fails.
pub const LOAD_FAILED: &str = "failed to load records";

/// Message shown when saving fails.
pub const SAVE_FAILED: &str = "failed to save record";

/// Message shown when deleting fails.
pub const DELETE_FAILED: &str = "failed to delete record";

/// State of the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// A fetch or mutation is in flight.
    Loading,
    /// Records reflect the store.
    Ready,
    /// The last action failed.
    Error(String),
}

/// Outcome of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The record was stored.
    Saved(ParkingRecord),
    /// The slot number was empty or malformed; nothing was written.
    NotAttempted,
    /// The backend failed; see the session state for the message.
    Failed,
}

/// A view session bound to one owner.
#[derive(Debug)]
pub struct Session<B> {
    api: ParkingApi<B>,
    owner: String,
    state: ViewState,
    records: Vec<ParkingRecord>,
    current: ParkingRecord,
    selected: Vehicle,
    pending_delete: Option<String>,
}

impl<B: RecordBackend> Session<B> {
    /// Create a session in the loading state. Call [`Session::refresh`] to populate it.
    pub fn new(api: ParkingApi<B>, owner: impl Into<String>) -> Self {
        Self {
            api,
            owner: owner.into(),
            state: ViewState::Loading,
            records: Vec::new(),
            current: ParkingRecord::placeholder(),
            selected: Vehicle::default(),
            pending_delete: None,
        }
    }

    /// Create a session and perform the initial fetch.
    pub fn start(api: ParkingApi<B>, owner: impl Into<String>) -> Self {
        let mut session = Self::new(api, owner);
        session.refresh();
        session
    }

    /// Current view state.
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The error message, if the last action failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// The owner this session reads and writes for.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Records as of the last fetch, newest first.
    #[must_use]
    pub fn records(&self) -> &[ParkingRecord] {
        &self.records
    }

    /// The most recent record, or the placeholder when there are none.
    #[must_use]
    pub fn current(&self) -> &ParkingRecord {
        &self.current
    }

    /// The most recent record for a vehicle.
    #[must_use]
    pub fn latest_for(&self, vehicle: Vehicle) -> Option<&ParkingRecord> {
        self.records.iter().find(|r| r.car == Some(vehicle))
    }

    /// The selected vehicle.
    #[must_use]
    pub fn selected(&self) -> Vehicle {
        self.selected
    }

    /// Select a vehicle for subsequent saves.
    pub fn select(&mut self, vehicle: Vehicle) {
        self.selected = vehicle;
    }

    /// Id of the record currently being deleted.
    #[must_use]
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Re-fetch records from the backend.
    ///
    /// Returns `true` when the session ends up ready.
    pub fn refresh(&mut self) -> bool {
        self.state = ViewState::Loading;
        match self.resync() {
            Ok(()) => {
                self.state = ViewState::Ready;
                true
            }
            Err(e) => {
                warn!("{}: {}", LOAD_FAILED, e);
                self.state = ViewState::Error(LOAD_FAILED.to_string());
                false
            }
        }
    }

    /// Save a new parking location for a vehicle.
    ///
    /// An empty or malformed slot number is not an error: nothing is written
    /// and the state is left alone.
    pub fn save(&mut self, floor: Floor, number: &str, car: Vehicle) -> SaveOutcome {
        let new_record = match NewRecord::new(floor, number, Some(car)) {
            Ok(new_record) => new_record,
            Err(e) => {
                debug!("Not saving: {}", e);
                return SaveOutcome::NotAttempted;
            }
        };

        self.selected = car;
        self.state = ViewState::Loading;
        let result = self
            .api
            .add(new_record, &self.owner)
            .and_then(|saved| self.resync().map(|()| saved));

        match result {
            Ok(saved) => {
                self.state = ViewState::Ready;
                SaveOutcome::Saved(saved)
            }
            Err(e) => {
                warn!("{}: {}", SAVE_FAILED, e);
                self.state = ViewState::Error(SAVE_FAILED.to_string());
                SaveOutcome::Failed
            }
        }
    }

    /// Delete a record, then re-fetch.
    ///
    /// Returns `true` when the delete and re-fetch both succeeded.
    pub fn delete(&mut self, id: &str) -> bool {
        self.pending_delete = Some(id.to_string());
        self.state = ViewState::Loading;

        let result = self
            .api
            .delete(id, &self.owner)
            .and_then(|()| self.resync());
        self.pending_delete = None;

        match result {
            Ok(()) => {
                self.state = ViewState::Ready;
                true
            }
            Err(e) => {
                warn!("{}: {}", DELETE_FAILED, e);
                self.state = ViewState::Error(DELETE_FAILED.to_string());
                false
            }
        }
    }

    fn resync(&mut self) -> Result<()> {
        let records = self.api.fetch(&self.owner)?;
        self.current = records
            .first()
            .cloned()
            .unwrap_or_else(ParkingRecord::placeholder);
        self.records = records;
        Ok(())
    }
}

/// Numeric slot entry, as typed on a keypad.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotInput {
    digits: String,
}

impl SlotInput {
    /// Create an empty input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a digit. Non-digits and digits past the third are ignored.
    ///
    /// Returns `true` if the digit was accepted.
    pub fn push(&mut self, digit: char) -> bool {
        if digit.is_ascii_digit() && self.digits.len() < MAX_SLOT_DIGITS {
            self.digits.push(digit);
            true
        } else {
            false
        }
    }

    /// Remove the last digit.
    pub fn backspace(&mut self) {
        self.digits.pop();
    }

    /// Remove all digits.
    pub fn clear(&mut self) {
        self.digits.clear();
    }

    /// Digits entered so far.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.digits
    }

    /// Check if nothing has been entered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Return the entered digits and reset the input.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.digits)
    }
}

impl FromIterator<char> for SlotInput {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut input = Self::new();
        for c in iter {
            input.push(c);
        }
        input
    }
}
