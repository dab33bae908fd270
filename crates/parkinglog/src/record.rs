//! Core record types for parkinglog.
//!
//! This module defines the parking record and the small symbol sets it is
//! built from: floor designators and vehicle tags.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum number of digits in a slot number.
pub const MAX_SLOT_DIGITS: usize = 3;

/// Identifier used by the placeholder record shown when nothing is stored.
pub const PLACEHOLDER_ID: &str = "default";

/// Basement level a floor designator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// First basement level.
    Basement1,
    /// Second basement level.
    Basement2,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basement1 => write!(f, "basement 1"),
            Self::Basement2 => write!(f, "basement 2"),
        }
    }
}

/// Floor designator of a parking slot.
///
/// `B1`/`B2` name a level directly. `Y`, `G`, `V` and `P` are colour zones:
/// yellow and green sit on the first basement, violet and pink on the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Floor {
    /// Basement level 1.
    B1,
    /// Basement level 2.
    B2,
    /// Yellow zone.
    Y,
    /// Green zone.
    G,
    /// Violet zone.
    V,
    /// Pink zone.
    P,
}

impl Floor {
    /// All floor designators.
    pub const ALL: [Floor; 6] = [Self::B1, Self::B2, Self::Y, Self::G, Self::V, Self::P];

    /// The basement level this designator is on.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::B1 | Self::Y | Self::G => Level::Basement1,
            Self::B2 | Self::V | Self::P => Level::Basement2,
        }
    }

    /// The designator as stored.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::Y => "Y",
            Self::G => "G",
            Self::V => "V",
            Self::P => "P",
        }
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Floor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|floor| floor.as_str() == upper)
            .ok_or_else(|| Error::UnknownFloor(s.to_string()))
    }
}

/// Vehicle a record belongs to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Vehicle {
    /// The G80.
    #[default]
    G80,
    /// The G90.
    G90,
}

impl Vehicle {
    /// All known vehicles.
    pub const ALL: [Vehicle; 2] = [Self::G80, Self::G90];

    /// The tag as stored.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::G80 => "G80",
            Self::G90 => "G90",
        }
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vehicle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|vehicle| vehicle.as_str() == upper)
            .ok_or_else(|| Error::UnknownVehicle(s.to_string()))
    }
}

fn slot_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{1,3}$").expect("slot pattern is valid"))
}

/// Check that a slot number is 1 to 3 ASCII digits.
///
/// # Errors
///
/// Returns [`Error::InvalidSlotNumber`] for empty, overlong or non-numeric input.
pub fn validate_slot_number(number: &str) -> Result<()> {
    if slot_pattern().is_match(number) {
        Ok(())
    } else {
        Err(Error::InvalidSlotNumber(number.to_string()))
    }
}

/// A request to record a new parking location.
///
/// Carries everything except the creation timestamp, which is stamped when
/// the record is handed to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Unique identifier for the record.
    pub id: String,
    /// Floor designator.
    pub floor: Floor,
    /// Slot number.
    pub number: String,
    /// Vehicle the record belongs to.
    pub car: Option<Vehicle>,
}

impl NewRecord {
    /// Create a new record request with a freshly generated identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot number is not 1 to 3 digits.
    pub fn new(floor: Floor, number: impl Into<String>, car: Option<Vehicle>) -> Result<Self> {
        let number = number.into();
        validate_slot_number(&number)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            floor,
            number,
            car,
        })
    }

    /// Stamp the request with a creation time.
    #[must_use]
    pub fn into_record(self, created_at: DateTime<Utc>) -> ParkingRecord {
        ParkingRecord {
            id: self.id,
            floor: self.floor,
            number: self.number,
            created_at,
            car: self.car,
        }
    }
}

/// A recorded parking location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingRecord {
    /// Unique identifier for this record.
    pub id: String,

    /// Floor designator.
    pub floor: Floor,

    /// Slot number, 1 to 3 digits.
    pub number: String,

    /// When the car was parked.
    pub created_at: DateTime<Utc>,

    /// Vehicle this record belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car: Option<Vehicle>,
}

impl ParkingRecord {
    /// The record shown when nothing has been saved yet. Never persisted.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            id: PLACEHOLDER_ID.to_string(),
            floor: Floor::B1,
            number: "00".to_string(),
            created_at: Utc::now(),
            car: None,
        }
    }

    /// Check if this is the placeholder record.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_ID
    }
}

/// Sort records newest first.
///
/// The sort is stable, so records with equal timestamps keep their order.
pub fn sort_newest_first(records: &mut [ParkingRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
