//! Stable per-installation user identity.

use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::kv::KeyValueStore;

/// Key holding the user identity.
pub const USER_ID_KEY: &str = "parking-user-id";

/// Return the persisted user id, generating and persisting one on first use.
///
/// The id never expires or rotates.
///
/// # Errors
///
/// Returns an error if the key-value store cannot be read or written.
pub fn get_or_create_user_id(kv: &impl KeyValueStore) -> Result<String> {
    if let Some(existing) = kv.get(USER_ID_KEY)?.filter(|id| !id.is_empty()) {
        return Ok(existing);
    }

    let user_id = Uuid::new_v4().to_string();
    kv.set(USER_ID_KEY, &user_id)?;
    info!("Generated new user id {}", user_id);
    Ok(user_id)
}
