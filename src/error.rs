use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardErrorKind {
    /// Fetch rejected, timed out, or answered with a non-2xx status.
    Network,
    /// Response body was not valid JSON or lacked expected fields.
    Parse,
    /// A persisted value could not be decoded.
    StorageCorruption,
    /// The local store could not be read or written.
    Storage,
    /// The controller was stopped before the operation started.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DashboardError {
    pub kind: DashboardErrorKind,
    pub message: String,
}

impl DashboardError {
    pub fn new(kind: DashboardErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub fn network_failure(message: impl Into<String>) -> DashboardError {
    DashboardError::new(DashboardErrorKind::Network, message)
}

pub fn parse_failure(message: impl Into<String>) -> DashboardError {
    DashboardError::new(DashboardErrorKind::Parse, message)
}

pub fn storage_corruption(message: impl Into<String>) -> DashboardError {
    DashboardError::new(DashboardErrorKind::StorageCorruption, message)
}

pub fn storage_failure(message: impl Into<String>) -> DashboardError {
    DashboardError::new(DashboardErrorKind::Storage, message)
}

pub fn controller_stopped(message: impl Into<String>) -> DashboardError {
    DashboardError::new(DashboardErrorKind::Stopped, message)
}
