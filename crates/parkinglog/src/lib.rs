//! `parkinglog` - Remember where the car is parked
//!
//! This library records the last parking locations for one or two vehicles,
//! keeping a short history per vehicle in either a local key-value store or
//! an owner-scoped relational table.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod identity;
pub mod kv;
pub mod logging;
pub mod record;
pub mod render;
pub mod session;
pub mod store;

pub use api::{ParkingApi, RecordBackend};
pub use config::{Backend, Config};
pub use database::Database;
pub use error::{Error, Result};
pub use identity::get_or_create_user_id;
pub use kv::{KeyValueStore, MemoryKv, SqliteKv};
pub use logging::init_logging;
pub use record::{Floor, NewRecord, ParkingRecord, Vehicle};
pub use session::{SaveOutcome, Session, SlotInput, ViewState};
pub use store::{RecordStore, Scope};
