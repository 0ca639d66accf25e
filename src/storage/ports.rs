use crate::error::DashboardError;

/// Synchronous string key/value store with last-writer-wins semantics.
/// Each key is written independently; there is no multi-key transaction.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, DashboardError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), DashboardError>;

    fn remove_item(&self, key: &str) -> Result<(), DashboardError>;

    fn keys(&self) -> Result<Vec<String>, DashboardError>;
}
