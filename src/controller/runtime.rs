use std::{
    collections::BTreeMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures_util::future::join_all;
use time::OffsetDateTime;
use tokio::{
    task::JoinHandle,
    time::{Duration, MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;

use crate::{
    autosave::{AutoSaver, FieldChange, RestoreOutcome, TrackedForm},
    backend::{DashboardBackend, WeatherReport},
    config::Config,
    controller::{
        renderer::DashboardRenderer,
        state::{DashboardSnapshot, DashboardState},
    },
    error::{DashboardError, controller_stopped},
    notifications::{Notification, NotificationSource, SeenSet},
    status::EmergencyStatus,
    storage::{EMERGENCY_STATUS_KEY, LocalStorage},
    toast::{ToastQueue, ToastSeverity},
};

const DATA_REFRESH_FAILED_MESSAGE: &str = "Failed to load dashboard data";

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub data_refresh: Duration,
    pub weather_refresh: Duration,
    pub notification_check: Duration,
    pub toast_duration: Duration,
    pub weather_alert_duration: Duration,
    pub autosave_debounce: Duration,
    pub autosave_ttl: time::Duration,
    pub weather_location: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            data_refresh: Duration::from_millis(30_000),
            weather_refresh: Duration::from_millis(300_000),
            notification_check: Duration::from_millis(10_000),
            toast_duration: Duration::from_millis(5_000),
            weather_alert_duration: Duration::from_millis(10_000),
            autosave_debounce: Duration::from_millis(1_000),
            autosave_ttl: time::Duration::hours(24),
            weather_location: "current".to_string(),
        }
    }
}

impl DashboardSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            data_refresh: Duration::from_millis(config.polling.data_refresh_ms),
            weather_refresh: Duration::from_millis(config.polling.weather_refresh_ms),
            notification_check: Duration::from_millis(config.polling.notification_check_ms),
            toast_duration: Duration::from_millis(config.toasts.default_duration_ms),
            weather_alert_duration: Duration::from_millis(config.toasts.weather_alert_duration_ms),
            autosave_debounce: Duration::from_millis(config.autosave.debounce_ms),
            autosave_ttl: autosave_ttl(config.autosave.ttl_hours),
            weather_location: config.backend.weather_location.clone(),
        }
    }
}

const MAX_AUTOSAVE_TTL_HOURS: u64 = i64::MAX as u64 / 3_600;

fn autosave_ttl(ttl_hours: u64) -> time::Duration {
    let hours = ttl_hours.min(MAX_AUTOSAVE_TTL_HOURS);
    time::Duration::hours(hours as i64)
}

/// External collaborators the controller is wired to.
pub struct DashboardPorts {
    pub backend: Arc<dyn DashboardBackend>,
    pub notifications: Arc<dyn NotificationSource>,
    pub storage: Arc<dyn LocalStorage>,
    pub renderer: Arc<dyn DashboardRenderer>,
}

struct DashboardShared {
    settings: DashboardSettings,
    backend: Arc<dyn DashboardBackend>,
    notifications: Arc<dyn NotificationSource>,
    storage: Arc<dyn LocalStorage>,
    renderer: Arc<dyn DashboardRenderer>,
    toasts: ToastQueue,
    autosaver: AutoSaver,
    state: Mutex<DashboardState>,
    forms: Mutex<BTreeMap<String, TrackedForm>>,
    shutdown: CancellationToken,
}

/// Owns all dashboard session state. `start` launches the data, weather and
/// notification-check tasks; `stop` flushes tracked forms and cancels them.
pub struct DashboardController {
    shared: Arc<DashboardShared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DashboardController {
    pub fn new(settings: DashboardSettings, ports: DashboardPorts) -> Self {
        let status = EmergencyStatus::restore(ports.storage.as_ref());
        let seen = SeenSet::load(ports.storage.as_ref());

        let autosaver = AutoSaver::new(
            Arc::clone(&ports.storage),
            settings.autosave_debounce,
            settings.autosave_ttl,
        );
        let purged = autosaver.purge_expired_at(OffsetDateTime::now_utc());

        let toast_renderer = Arc::clone(&ports.renderer);
        let toasts = ToastQueue::new(settings.toast_duration)
            .with_observer(Arc::new(move |toasts| toast_renderer.render_toasts(toasts)));

        tracing::info!(
            target: "dashboard.controller",
            status = %status,
            seen_notifications = seen.len(),
            purged_autosaves = purged,
            "dashboard_initialized"
        );

        Self {
            shared: Arc::new(DashboardShared {
                settings,
                backend: ports.backend,
                notifications: ports.notifications,
                storage: ports.storage,
                renderer: ports.renderer,
                toasts,
                autosaver,
                state: Mutex::new(DashboardState::new(status, seen)),
                forms: Mutex::new(BTreeMap::new()),
                shutdown: CancellationToken::new(),
            }),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn start(&self) {
        if self.shared.is_detached() {
            tracing::warn!(target: "dashboard.controller", "start_after_stop_ignored");
            return;
        }

        let mut tasks = lock(&self.tasks);
        if !tasks.is_empty() {
            return;
        }

        let settings = &self.shared.settings;
        tasks.push(spawn_periodic(
            Arc::clone(&self.shared),
            "data_refresh",
            settings.data_refresh,
            |shared| async move {
                let _ = shared.refresh_data().await;
            },
        ));
        tasks.push(spawn_periodic(
            Arc::clone(&self.shared),
            "weather_refresh",
            settings.weather_refresh,
            |shared| async move {
                let _ = shared.refresh_weather().await;
            },
        ));
        tasks.push(spawn_periodic(
            Arc::clone(&self.shared),
            "notification_check",
            settings.notification_check,
            |shared| async move {
                let _ = shared.check_notifications().await;
            },
        ));

        tracing::info!(
            target: "dashboard.controller",
            data_refresh_ms = settings.data_refresh.as_millis() as u64,
            weather_refresh_ms = settings.weather_refresh.as_millis() as u64,
            notification_check_ms = settings.notification_check.as_millis() as u64,
            "polling_started"
        );
    }

    /// Flushes every tracked form immediately, then cancels the periodic
    /// tasks and pending timers. No callback fires after this returns.
    pub async fn stop(&self) {
        if self.shared.is_detached() {
            return;
        }

        let forms: Vec<TrackedForm> = lock(&self.shared.forms).values().cloned().collect();
        for form in &forms {
            if let Err(err) = self.shared.autosaver.flush(form) {
                tracing::warn!(
                    target: "dashboard.controller",
                    form_id = %form.id,
                    error = %err,
                    "form_flush_failed"
                );
            }
        }

        self.shared.shutdown.cancel();
        self.shared.autosaver.cancel_all();
        self.shared.toasts.clear();

        let tasks: Vec<JoinHandle<()>> = lock(&self.tasks).drain(..).collect();
        for result in join_all(tasks).await {
            if let Err(err) = result {
                tracing::warn!(target: "dashboard.controller", error = %err, "polling_task_join_failed");
            }
        }

        tracing::info!(
            target: "dashboard.controller",
            flushed_forms = forms.len(),
            "dashboard_stopped"
        );
    }

    pub fn is_running(&self) -> bool {
        !self.shared.is_detached() && !lock(&self.tasks).is_empty()
    }

    pub fn status(&self) -> EmergencyStatus {
        self.shared.status()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.shared.snapshot()
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.shared.toasts
    }

    pub fn show_toast(&self, message: impl Into<String>, severity: ToastSeverity) -> String {
        self.shared.toasts.show(message, severity)
    }

    pub fn show_toast_for(
        &self,
        message: impl Into<String>,
        severity: ToastSeverity,
        duration: Duration,
    ) -> String {
        self.shared.toasts.show_for(message, severity, duration)
    }

    pub fn dismiss_toast(&self, id: &str) -> bool {
        self.shared.toasts.dismiss(id)
    }

    pub async fn refresh_data(&self) -> Result<EmergencyStatus, DashboardError> {
        self.shared.refresh_data().await
    }

    pub async fn refresh_weather(&self) -> Result<WeatherReport, DashboardError> {
        self.shared.refresh_weather().await
    }

    pub async fn check_notifications(&self) -> Result<usize, DashboardError> {
        self.shared.check_notifications().await
    }

    pub fn deliver_notification(&self, notification: &Notification) -> bool {
        self.shared.deliver_notification(notification)
    }

    /// Starts tracking the form and restores its saved state when one exists.
    pub fn register_form(&self, mut form: TrackedForm) -> RestoreOutcome {
        let outcome = self.shared.autosaver.restore(&mut form);
        lock(&self.shared.forms).insert(form.id.clone(), form);
        outcome
    }

    pub fn unregister_form(&self, form_id: &str) -> Option<TrackedForm> {
        self.shared.autosaver.cancel(form_id);
        lock(&self.shared.forms).remove(form_id)
    }

    pub fn form(&self, form_id: &str) -> Option<TrackedForm> {
        lock(&self.shared.forms).get(form_id).cloned()
    }

    /// Applies a field edit and schedules a debounced save. Returns false for
    /// unknown forms or fields, and after `stop`.
    pub fn change_field(&self, form_id: &str, change: &FieldChange) -> bool {
        if self.shared.is_detached() {
            return false;
        }

        let updated = {
            let mut forms = lock(&self.shared.forms);
            let Some(form) = forms.get_mut(form_id) else {
                return false;
            };
            if !form.apply_change(change) {
                return false;
            }
            form.clone()
        };

        self.shared.autosaver.schedule(&updated);
        true
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
    }
}

impl DashboardShared {
    fn is_detached(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn status(&self) -> EmergencyStatus {
        lock(&self.state).status
    }

    fn snapshot(&self) -> DashboardSnapshot {
        let toasts = self.toasts.visible();
        lock(&self.state).snapshot(toasts)
    }

    fn render(&self) {
        let snapshot = self.snapshot();
        self.renderer.render(&snapshot);
    }

    #[tracing::instrument(name = "dashboard_refresh_data", target = "dashboard.controller", skip(self))]
    async fn refresh_data(&self) -> Result<EmergencyStatus, DashboardError> {
        if self.is_detached() {
            return Ok(self.status());
        }

        let result = self.backend.fetch_scenarios().await;
        if self.is_detached() {
            tracing::debug!(target: "dashboard.controller", "late_scenarios_response_dropped");
            return Ok(self.status());
        }

        let scenarios = match result {
            Ok(scenarios) => scenarios,
            Err(err) => {
                tracing::warn!(
                    target: "dashboard.controller",
                    kind = ?err.kind,
                    error = %err,
                    "dashboard_data_refresh_failed"
                );
                self.toasts
                    .show(DATA_REFRESH_FAILED_MESSAGE, ToastSeverity::Error);
                return Err(err);
            }
        };

        let (previous, status) = {
            let mut state = lock(&self.state);
            let previous = state.apply_scenarios(&scenarios, OffsetDateTime::now_utc());
            (previous, state.status)
        };

        if previous != status {
            tracing::info!(
                target: "dashboard.controller",
                from = %previous,
                to = %status,
                scenarios = scenarios.len(),
                "emergency_status_changed"
            );
        }
        if let Err(err) = self.storage.set_item(EMERGENCY_STATUS_KEY, status.as_str()) {
            tracing::warn!(target: "dashboard.controller", error = %err, "emergency_status_persist_failed");
        }

        self.render();
        Ok(status)
    }

    #[tracing::instrument(name = "dashboard_refresh_weather", target = "dashboard.controller", skip(self))]
    async fn refresh_weather(&self) -> Result<WeatherReport, DashboardError> {
        if self.is_detached() {
            return Err(controller_stopped("weather refresh skipped after stop"));
        }

        let result = self
            .backend
            .fetch_weather(&self.settings.weather_location)
            .await;
        if self.is_detached() {
            tracing::debug!(target: "dashboard.controller", "late_weather_response_dropped");
            return result;
        }

        let report = match result {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(
                    target: "dashboard.controller",
                    kind = ?err.kind,
                    error = %err,
                    "weather_refresh_failed"
                );
                return Err(err);
            }
        };

        for alert in &report.alerts {
            self.toasts.show_for(
                format!("Weather Alert: {}", alert.title),
                ToastSeverity::Warning,
                self.settings.weather_alert_duration,
            );
        }
        lock(&self.state).apply_weather(report.clone());

        self.render();
        Ok(report)
    }

    async fn check_notifications(&self) -> Result<usize, DashboardError> {
        if self.is_detached() {
            return Ok(0);
        }

        let candidates = match self.notifications.poll().await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!(
                    target: "dashboard.controller",
                    error = %err,
                    "notification_check_failed"
                );
                return Err(err);
            }
        };
        if self.is_detached() {
            return Ok(0);
        }

        Ok(candidates
            .iter()
            .filter(|notification| self.deliver_notification(notification))
            .count())
    }

    fn deliver_notification(&self, notification: &Notification) -> bool {
        let seen = {
            let mut state = lock(&self.state);
            if !state.seen.admit(notification.identity()) {
                return false;
            }
            state.seen.clone()
        };

        if let Err(err) = seen.persist(self.storage.as_ref()) {
            tracing::warn!(target: "dashboard.controller", error = %err, "seen_notifications_persist_failed");
        }
        self.toasts
            .show(notification.message.clone(), notification.kind.into());
        tracing::debug!(
            target: "dashboard.controller",
            kind = ?notification.kind,
            seen_notifications = seen.len(),
            "notification_displayed"
        );
        true
    }
}

fn spawn_periodic<F, Fut>(
    shared: Arc<DashboardShared>,
    task_name: &'static str,
    period: Duration,
    tick: F,
) -> JoinHandle<()>
where
    F: Fn(Arc<DashboardShared>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let shutdown = shared.shutdown.clone();
        let mut ticker = interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tick(Arc::clone(&shared)) => {}
                    }
                }
            }
        }

        tracing::debug!(target: "dashboard.controller", task = task_name, "polling_task_stopped");
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
