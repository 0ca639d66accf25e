use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    thread,
};

use serde::Serialize;
use tokio::{
    runtime::Handle,
    task::AbortHandle,
    time::{Duration, sleep},
};
use uuid::Uuid;

use crate::notifications::NotificationKind;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastSeverity {
    Info,
    Warning,
    Error,
    Success,
}

impl From<NotificationKind> for ToastSeverity {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Info => Self::Info,
            NotificationKind::Warning => Self::Warning,
            NotificationKind::Error => Self::Error,
            NotificationKind::Success => Self::Success,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: String,
    pub message: String,
    pub severity: ToastSeverity,
    #[serde(rename = "duration_ms", serialize_with = "serialize_duration_ms")]
    pub duration: Duration,
}

fn serialize_duration_ms<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

pub type ToastObserver = Arc<dyn Fn(&[Toast]) + Send + Sync>;

struct ToastEntry {
    toast: Toast,
    expiry: Option<AbortHandle>,
}

#[derive(Default)]
struct ToastQueueState {
    entries: Vec<ToastEntry>,
}

/// Display container for toasts. Toasts coexist in insertion order and each
/// one owns an expiry timer: a tokio task when a runtime is available, a
/// plain thread otherwise. Whichever of expiry or manual dismissal runs first
/// removes the toast, the other becomes a no-op.
#[derive(Clone)]
pub struct ToastQueue {
    state: Arc<Mutex<ToastQueueState>>,
    default_duration: Duration,
    observer: Option<ToastObserver>,
}

impl fmt::Debug for ToastQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastQueue")
            .field("visible", &self.len())
            .field("default_duration", &self.default_duration)
            .finish()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl ToastQueue {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(ToastQueueState::default())),
            default_duration,
            observer: None,
        }
    }

    /// Observer is called with the visible toasts after every change.
    pub fn with_observer(mut self, observer: ToastObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    pub fn show(&self, message: impl Into<String>, severity: ToastSeverity) -> String {
        self.show_for(message, severity, self.default_duration)
    }

    pub fn show_for(
        &self,
        message: impl Into<String>,
        severity: ToastSeverity,
        duration: Duration,
    ) -> String {
        let toast = Toast {
            id: Uuid::now_v7().to_string(),
            message: message.into(),
            severity,
            duration,
        };
        let id = toast.id.clone();
        tracing::debug!(
            target: "dashboard.toast",
            toast_id = %id,
            severity = ?severity,
            duration_ms = duration.as_millis() as u64,
            "toast_shown"
        );

        lock_state(&self.state).entries.push(ToastEntry {
            toast,
            expiry: None,
        });
        self.notify();

        match Handle::try_current() {
            Ok(runtime) => {
                let state = Arc::downgrade(&self.state);
                let observer = self.observer.clone();
                let expiring_id = id.clone();
                let expiry = runtime
                    .spawn(async move {
                        sleep(duration).await;
                        expire(state, &expiring_id, observer);
                    })
                    .abort_handle();

                let mut guard = lock_state(&self.state);
                match guard.entries.iter_mut().find(|entry| entry.toast.id == id) {
                    Some(entry) => entry.expiry = Some(expiry),
                    None => expiry.abort(),
                }
            }
            Err(_) => {
                let state = Arc::downgrade(&self.state);
                let observer = self.observer.clone();
                let expiring_id = id.clone();
                let spawned = thread::Builder::new()
                    .name("dashboard-toast-expiry".to_string())
                    .spawn(move || {
                        thread::sleep(duration);
                        expire(state, &expiring_id, observer);
                    });
                if let Err(err) = spawned {
                    tracing::warn!(
                        target: "dashboard.toast",
                        toast_id = %id,
                        error = %err,
                        "toast_expiry_thread_failed"
                    );
                }
            }
        }

        id
    }

    /// Removes the toast and cancels its pending expiry. Returns false when
    /// the toast is already gone.
    pub fn dismiss(&self, id: &str) -> bool {
        let removed = take_entry(&self.state, id);
        let Some(entry) = removed else {
            return false;
        };

        if let Some(expiry) = entry.expiry {
            expiry.abort();
        }
        tracing::debug!(target: "dashboard.toast", toast_id = %id, "toast_dismissed");
        self.notify();
        true
    }

    pub fn clear(&self) {
        let drained: Vec<ToastEntry> = lock_state(&self.state).entries.drain(..).collect();
        if drained.is_empty() {
            return;
        }
        for entry in drained {
            if let Some(expiry) = entry.expiry {
                expiry.abort();
            }
        }
        self.notify();
    }

    pub fn visible(&self) -> Vec<Toast> {
        lock_state(&self.state)
            .entries
            .iter()
            .map(|entry| entry.toast.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        lock_state(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(&self) {
        notify_observer(&self.state, self.observer.as_ref());
    }
}

fn lock_state(state: &Mutex<ToastQueueState>) -> MutexGuard<'_, ToastQueueState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn take_entry(state: &Mutex<ToastQueueState>, id: &str) -> Option<ToastEntry> {
    let mut guard = lock_state(state);
    let position = guard.entries.iter().position(|entry| entry.toast.id == id)?;
    Some(guard.entries.remove(position))
}

fn expire(state: Weak<Mutex<ToastQueueState>>, id: &str, observer: Option<ToastObserver>) {
    let Some(state) = state.upgrade() else {
        return;
    };
    if take_entry(&state, id).is_some() {
        tracing::debug!(target: "dashboard.toast", toast_id = %id, "toast_expired");
        notify_observer(&state, observer.as_ref());
    }
}

fn notify_observer(state: &Mutex<ToastQueueState>, observer: Option<&ToastObserver>) {
    let Some(observer) = observer else {
        return;
    };
    let visible: Vec<Toast> = lock_state(state)
        .entries
        .iter()
        .map(|entry| entry.toast.clone())
        .collect();
    observer(&visible);
}
