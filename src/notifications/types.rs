use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>, timestamp: OffsetDateTime) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp,
        }
    }

    /// Dedup identity: message text followed by the RFC 3339 timestamp.
    pub fn identity(&self) -> String {
        let stamp = self
            .timestamp
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.timestamp.unix_timestamp_nanos().to_string());
        format!("{}{}", self.message, stamp)
    }
}
