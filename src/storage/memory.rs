use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use crate::{
    error::{DashboardError, storage_failure},
    storage::ports::LocalStorage,
};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, DashboardError> {
        self.items
            .lock()
            .map_err(|_| storage_failure("memory storage lock poisoned"))
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, DashboardError> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), DashboardError> {
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), DashboardError> {
        self.items()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, DashboardError> {
        Ok(self.items()?.keys().cloned().collect())
    }
}
