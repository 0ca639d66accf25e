use std::collections::VecDeque;

use crate::{
    error::DashboardError,
    storage::{LocalStorage, SEEN_NOTIFICATIONS_KEY, read_json, write_json},
};

pub const SEEN_SET_CAPACITY: usize = 50;

/// Bounded, insertion-ordered record of displayed notification identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenSet {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::with_capacity(SEEN_SET_CAPACITY)
    }
}

impl SeenSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn load(storage: &dyn LocalStorage) -> Self {
        let mut seen = Self::default();
        let stored: Vec<String> = read_json(storage, SEEN_NOTIFICATIONS_KEY).unwrap_or_default();
        for identity in stored {
            seen.admit(identity);
        }
        seen
    }

    pub fn persist(&self, storage: &dyn LocalStorage) -> Result<(), DashboardError> {
        write_json(storage, SEEN_NOTIFICATIONS_KEY, &self.entries)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.iter().any(|entry| entry == identity)
    }

    /// Returns false when the identity was already present. Otherwise appends
    /// it, evicting the oldest entries beyond capacity.
    pub fn admit(&mut self, identity: impl Into<String>) -> bool {
        let identity = identity.into();
        if self.contains(&identity) {
            return false;
        }

        self.entries.push_back(identity);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
