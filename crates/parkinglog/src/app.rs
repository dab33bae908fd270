//! Startup wiring: open storage, resolve the user, start a session.

use tracing::info;

use crate::api::{ParkingApi, RecordBackend};
use crate::config::{Backend, Config};
use crate::database::Database;
use crate::error::Result;
use crate::identity::get_or_create_user_id;
use crate::kv::SqliteKv;
use crate::session::Session;
use crate::store::RecordStore;

/// A session over whichever backend the configuration selects.
pub type AppSession = Session<Box<dyn RecordBackend>>;

/// Open the configured backend and start a session for the local user.
///
/// The key-value database is always opened because it holds the user id.
/// With the local backend it also holds the records.
///
/// # Errors
///
/// Returns an error if either database cannot be opened or the user id
/// cannot be read or created.
pub fn open_session(config: &Config) -> Result<AppSession> {
    let kv = SqliteKv::open(config.kv_path())?;
    let user_id = get_or_create_user_id(&kv)?;
    let capacity = config.storage.capacity;

    let backend: Box<dyn RecordBackend> = match config.storage.backend {
        Backend::Local => Box::new(RecordStore::with_capacity(kv, capacity)),
        Backend::Database => {
            Box::new(Database::open(config.database_path())?.with_capacity(capacity))
        }
    };
    info!(
        "Using {} backend for user {}",
        config.storage.backend, user_id
    );

    Ok(Session::start(ParkingApi::new(backend), user_id))
}
