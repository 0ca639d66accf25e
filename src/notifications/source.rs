use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    config::FeedNotificationConfig,
    error::DashboardError,
    notifications::types::Notification,
};

/// Supplies candidate notifications on every notification-check tick.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn poll(&self) -> Result<Vec<Notification>, DashboardError>;
}

#[derive(Debug, Default)]
pub struct NoopNotificationSource;

#[async_trait]
impl NotificationSource for NoopNotificationSource {
    async fn poll(&self) -> Result<Vec<Notification>, DashboardError> {
        Ok(Vec::new())
    }
}

/// Replays a fixed list on every poll. Entries keep their configured
/// timestamp; the rest share `stamped_at`. Identities therefore stay stable
/// across polls and restarts, and the Seen-Set suppresses repeats.
#[derive(Debug, Clone, Default)]
pub struct StaticNotificationSource {
    notifications: Vec<Notification>,
}

impl StaticNotificationSource {
    pub fn new(notifications: Vec<Notification>) -> Self {
        Self { notifications }
    }

    pub fn from_feed(feed: &[FeedNotificationConfig], stamped_at: OffsetDateTime) -> Self {
        Self::new(
            feed.iter()
                .map(|entry| {
                    Notification::new(
                        entry.kind,
                        entry.message.clone(),
                        entry.timestamp.unwrap_or(stamped_at),
                    )
                })
                .collect(),
        )
    }
}

#[async_trait]
impl NotificationSource for StaticNotificationSource {
    async fn poll(&self) -> Result<Vec<Notification>, DashboardError> {
        Ok(self.notifications.clone())
    }
}
