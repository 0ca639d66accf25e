use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::{
    runtime::Handle,
    task::AbortHandle,
    time::{Duration, sleep},
};

use crate::{
    autosave::form::TrackedForm,
    error::DashboardError,
    storage::{AUTOSAVE_KEY_PREFIX, LocalStorage, autosave_key, decode_json, write_json},
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1_000);
pub const DEFAULT_TTL: time::Duration = time::Duration::hours(24);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSaveRecord {
    pub data: BTreeMap<String, String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored { saved_at: OffsetDateTime },
    NotFound,
    /// The record outlived its TTL and has been purged.
    Expired { saved_at: OffsetDateTime },
}

impl RestoreOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, Self::Restored { .. })
    }
}

struct PendingSave {
    generation: u64,
    handle: AbortHandle,
}

struct AutoSaverShared {
    storage: Arc<dyn LocalStorage>,
    debounce: Duration,
    ttl: time::Duration,
    pending: Mutex<HashMap<String, PendingSave>>,
    next_generation: AtomicU64,
}

/// Debounced per-form persistence. At most one write is pending per form;
/// every new change replaces it and restarts the quiet period.
#[derive(Clone)]
pub struct AutoSaver {
    shared: Arc<AutoSaverShared>,
}

impl AutoSaver {
    pub fn new(storage: Arc<dyn LocalStorage>, debounce: Duration, ttl: time::Duration) -> Self {
        Self {
            shared: Arc::new(AutoSaverShared {
                storage,
                debounce,
                ttl,
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
            }),
        }
    }

    pub fn with_defaults(storage: Arc<dyn LocalStorage>) -> Self {
        Self::new(storage, DEFAULT_DEBOUNCE, DEFAULT_TTL)
    }

    pub fn schedule(&self, form: &TrackedForm) {
        let form_id = form.id.clone();
        let data = form.field_values();

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!(
                    target: "dashboard.autosave",
                    form_id = %form_id,
                    "autosave_without_runtime_writes_immediately"
                );
                self.write_logged(&form_id, data, OffsetDateTime::now_utc());
                return;
            }
        };

        let generation = self.shared.next_generation.fetch_add(1, Ordering::Relaxed);
        let saver = self.clone();
        let task_form_id = form_id.clone();
        let debounce = self.shared.debounce;

        let mut pending = self.pending();
        if let Some(previous) = pending.remove(&form_id) {
            previous.handle.abort();
        }
        let handle = runtime
            .spawn(async move {
                sleep(debounce).await;
                saver.complete_pending(&task_form_id, generation, data);
            })
            .abort_handle();
        pending.insert(form_id, PendingSave { generation, handle });
    }

    /// Cancels any pending write for the form and persists its current state.
    pub fn flush(&self, form: &TrackedForm) -> Result<(), DashboardError> {
        self.cancel(&form.id);
        self.save_at(&form.id, form.field_values(), OffsetDateTime::now_utc())
    }

    pub fn save_at(
        &self,
        form_id: &str,
        data: BTreeMap<String, String>,
        saved_at: OffsetDateTime,
    ) -> Result<(), DashboardError> {
        let record = AutoSaveRecord {
            data,
            timestamp: saved_at,
        };
        write_json(self.shared.storage.as_ref(), &autosave_key(form_id), &record)?;
        tracing::debug!(
            target: "dashboard.autosave",
            form_id = %form_id,
            fields = record.data.len(),
            "autosave_written"
        );
        Ok(())
    }

    pub fn restore(&self, form: &mut TrackedForm) -> RestoreOutcome {
        self.restore_at(form, OffsetDateTime::now_utc())
    }

    pub fn restore_at(&self, form: &mut TrackedForm, now: OffsetDateTime) -> RestoreOutcome {
        let key = autosave_key(&form.id);
        let Some(record) = self.load_record(&key) else {
            return RestoreOutcome::NotFound;
        };

        if now - record.timestamp > self.shared.ttl {
            self.purge(&key);
            tracing::info!(
                target: "dashboard.autosave",
                form_id = %form.id,
                "autosave_expired"
            );
            return RestoreOutcome::Expired {
                saved_at: record.timestamp,
            };
        }

        form.apply_values(&record.data);
        tracing::info!(
            target: "dashboard.autosave",
            form_id = %form.id,
            fields = record.data.len(),
            "autosave_restored"
        );
        RestoreOutcome::Restored {
            saved_at: record.timestamp,
        }
    }

    /// Removes every stored record older than the TTL and returns how many
    /// were purged.
    pub fn purge_expired_at(&self, now: OffsetDateTime) -> usize {
        let keys = match self.shared.storage.keys() {
            Ok(keys) => keys,
            Err(err) => {
                tracing::warn!(target: "dashboard.autosave", error = %err, "autosave_scan_failed");
                return 0;
            }
        };

        let mut purged = 0;
        for key in keys.iter().filter(|key| key.starts_with(AUTOSAVE_KEY_PREFIX)) {
            if let Some(record) = self.load_record(key)
                && now - record.timestamp > self.shared.ttl
            {
                self.purge(key);
                purged += 1;
            }
        }
        purged
    }

    pub fn record(&self, form_id: &str) -> Option<AutoSaveRecord> {
        self.load_record(&autosave_key(form_id))
    }

    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    pub fn cancel(&self, form_id: &str) {
        if let Some(previous) = self.pending().remove(form_id) {
            previous.handle.abort();
        }
    }

    pub fn cancel_all(&self) {
        for (_, previous) in self.pending().drain() {
            previous.handle.abort();
        }
    }

    fn complete_pending(&self, form_id: &str, generation: u64, data: BTreeMap<String, String>) {
        {
            let mut pending = self.pending();
            match pending.get(form_id) {
                Some(current) if current.generation == generation => {
                    pending.remove(form_id);
                }
                _ => return,
            }
        }
        self.write_logged(form_id, data, OffsetDateTime::now_utc());
    }

    fn write_logged(&self, form_id: &str, data: BTreeMap<String, String>, saved_at: OffsetDateTime) {
        if let Err(err) = self.save_at(form_id, data, saved_at) {
            tracing::warn!(
                target: "dashboard.autosave",
                form_id = %form_id,
                error = %err,
                "autosave_write_failed"
            );
        }
    }

    fn load_record(&self, key: &str) -> Option<AutoSaveRecord> {
        let raw = match self.shared.storage.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(target: "dashboard.autosave", key, error = %err, "autosave_read_failed");
                return None;
            }
        };
        match decode_json(key, &raw) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(target: "dashboard.autosave", key, error = %err, "autosave_record_corrupted");
                None
            }
        }
    }

    fn purge(&self, key: &str) {
        if let Err(err) = self.shared.storage.remove_item(key) {
            tracing::warn!(target: "dashboard.autosave", key, error = %err, "autosave_purge_failed");
        }
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<String, PendingSave>> {
        self.shared
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
