pub mod file;
pub mod memory;
pub mod ports;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{DashboardError, storage_corruption, storage_failure};

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use ports::LocalStorage;

pub const EMERGENCY_STATUS_KEY: &str = "emergency_status";
pub const SEEN_NOTIFICATIONS_KEY: &str = "seen_notifications";
pub const AUTOSAVE_KEY_PREFIX: &str = "autosave_";

pub fn autosave_key(form_id: &str) -> String {
    format!("{AUTOSAVE_KEY_PREFIX}{form_id}")
}

pub fn decode_json<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, DashboardError> {
    serde_json::from_str(raw)
        .map_err(|err| storage_corruption(format!("stored value for '{key}' is corrupted: {err}")))
}

/// Reads and decodes a JSON value. Missing keys, unreadable stores and
/// corrupted values all come back as `None`.
pub fn read_json<T: DeserializeOwned>(storage: &dyn LocalStorage, key: &str) -> Option<T> {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(target: "dashboard.storage", key, error = %err, "storage_read_failed");
            return None;
        }
    };

    match decode_json(key, &raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(target: "dashboard.storage", key, error = %err, "storage_value_corrupted");
            None
        }
    }
}

pub fn write_json<T: Serialize>(
    storage: &dyn LocalStorage,
    key: &str,
    value: &T,
) -> Result<(), DashboardError> {
    let encoded = serde_json::to_string(value)
        .map_err(|err| storage_failure(format!("failed to encode value for '{key}': {err}")))?;
    storage.set_item(key, &encoded)
}
