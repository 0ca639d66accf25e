use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Notify;

use emergency_dashboard::{
    backend::{DashboardBackend, Scenario, WeatherReport},
    controller::{
        DashboardController, DashboardPorts, DashboardRenderer, DashboardSettings,
        DashboardSnapshot,
    },
    error::{DashboardError, network_failure},
    notifications::{NoopNotificationSource, Notification, NotificationSource},
    storage::{LocalStorage, MemoryStorage},
    toast::Toast,
};

pub struct ScriptedBackend {
    scenarios: Mutex<Result<Vec<Scenario>, DashboardError>>,
    weather: Mutex<Result<WeatherReport, DashboardError>>,
    scenario_gate: Mutex<Option<Arc<Notify>>>,
    scenario_calls: AtomicUsize,
    weather_calls: AtomicUsize,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self {
            scenarios: Mutex::new(Ok(Vec::new())),
            weather: Mutex::new(Ok(WeatherReport::default())),
            scenario_gate: Mutex::new(None),
            scenario_calls: AtomicUsize::new(0),
            weather_calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedBackend {
    pub fn set_scenarios(&self, response: Result<Vec<Scenario>, DashboardError>) {
        *self.scenarios.lock().expect("lock") = response;
    }

    pub fn set_weather(&self, response: Result<WeatherReport, DashboardError>) {
        *self.weather.lock().expect("lock") = response;
    }

    /// Holds every scenario fetch until the returned gate is notified.
    pub fn gate_scenarios(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.scenario_gate.lock().expect("lock") = Some(Arc::clone(&gate));
        gate
    }

    pub fn scenario_calls(&self) -> usize {
        self.scenario_calls.load(Ordering::SeqCst)
    }

    pub fn weather_calls(&self) -> usize {
        self.weather_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DashboardBackend for ScriptedBackend {
    async fn fetch_scenarios(&self) -> Result<Vec<Scenario>, DashboardError> {
        self.scenario_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.scenario_gate.lock().expect("lock").clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.scenarios.lock().expect("lock").clone()
    }

    async fn fetch_weather(&self, _location: &str) -> Result<WeatherReport, DashboardError> {
        self.weather_calls.fetch_add(1, Ordering::SeqCst);
        self.weather.lock().expect("lock").clone()
    }
}

pub struct ScriptedNotifications {
    pending: Mutex<Result<Vec<Notification>, DashboardError>>,
    polls: AtomicUsize,
}

impl ScriptedNotifications {
    pub fn replaying(notifications: Vec<Notification>) -> Self {
        Self {
            pending: Mutex::new(Ok(notifications)),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            pending: Mutex::new(Err(network_failure(message))),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSource for ScriptedNotifications {
    async fn poll(&self) -> Result<Vec<Notification>, DashboardError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().expect("lock").clone()
    }
}

#[derive(Default)]
pub struct RecordingRenderer {
    snapshots: Mutex<Vec<DashboardSnapshot>>,
    toast_frames: Mutex<Vec<Vec<Toast>>>,
}

impl RecordingRenderer {
    pub fn snapshots(&self) -> Vec<DashboardSnapshot> {
        self.snapshots.lock().expect("lock").clone()
    }

    pub fn toast_frames(&self) -> Vec<Vec<Toast>> {
        self.toast_frames.lock().expect("lock").clone()
    }
}

impl DashboardRenderer for RecordingRenderer {
    fn render(&self, snapshot: &DashboardSnapshot) {
        self.snapshots.lock().expect("lock").push(snapshot.clone());
    }

    fn render_toasts(&self, toasts: &[Toast]) {
        self.toast_frames.lock().expect("lock").push(toasts.to_vec());
    }
}

/// Memory storage that also logs every write.
#[derive(Default)]
pub struct CountingStorage {
    inner: MemoryStorage,
    writes: Mutex<Vec<(String, String)>>,
}

impl CountingStorage {
    pub fn writes_for(&self, key: &str) -> Vec<String> {
        self.writes
            .lock()
            .expect("lock")
            .iter()
            .filter(|(written_key, _)| written_key == key)
            .map(|(_, value)| value.clone())
            .collect()
    }
}

impl LocalStorage for CountingStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, DashboardError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), DashboardError> {
        self.writes
            .lock()
            .expect("lock")
            .push((key.to_string(), value.to_string()));
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), DashboardError> {
        self.inner.remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>, DashboardError> {
        self.inner.keys()
    }
}

pub struct Harness {
    pub controller: DashboardController,
    pub backend: Arc<ScriptedBackend>,
    pub storage: Arc<CountingStorage>,
    pub renderer: Arc<RecordingRenderer>,
}

pub fn harness() -> Harness {
    harness_with(
        Arc::new(ScriptedBackend::default()),
        Arc::new(CountingStorage::default()),
        Arc::new(NoopNotificationSource),
    )
}

pub fn harness_with(
    backend: Arc<ScriptedBackend>,
    storage: Arc<CountingStorage>,
    notifications: Arc<dyn NotificationSource>,
) -> Harness {
    let renderer = Arc::new(RecordingRenderer::default());
    let controller = DashboardController::new(
        DashboardSettings::default(),
        DashboardPorts {
            backend: backend.clone(),
            notifications,
            storage: storage.clone(),
            renderer: renderer.clone(),
        },
    );

    Harness {
        controller,
        backend,
        storage,
        renderer,
    }
}

pub fn scenarios(severities: &[&str]) -> Vec<Scenario> {
    severities
        .iter()
        .map(|severity| Scenario::with_severity(*severity))
        .collect()
}
