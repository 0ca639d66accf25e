pub mod seen;
pub mod source;
pub mod types;

pub use seen::{SEEN_SET_CAPACITY, SeenSet};
pub use source::{NoopNotificationSource, NotificationSource, StaticNotificationSource};
pub use types::{Notification, NotificationKind};
