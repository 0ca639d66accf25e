use crate::{controller::state::DashboardSnapshot, toast::Toast};

/// Presentation boundary. Receives immutable snapshots; never mutates
/// controller state.
pub trait DashboardRenderer: Send + Sync {
    fn render(&self, snapshot: &DashboardSnapshot);

    fn render_toasts(&self, _toasts: &[Toast]) {}
}

#[derive(Debug, Default)]
pub struct NoopRenderer;

impl DashboardRenderer for NoopRenderer {
    fn render(&self, _snapshot: &DashboardSnapshot) {}
}

/// Headless renderer that reports every view update as a tracing event.
#[derive(Debug, Default)]
pub struct TracingRenderer;

impl DashboardRenderer for TracingRenderer {
    fn render(&self, snapshot: &DashboardSnapshot) {
        tracing::info!(
            target: "dashboard.view",
            status = %snapshot.status,
            scenarios = %snapshot.total_label,
            critical = snapshot.summary.critical,
            temperature = snapshot.weather.as_ref().map(|weather| weather.temperature.as_str()),
            impact = ?snapshot.weather_impact.as_ref().map(|impact| impact.level),
            "dashboard_rendered"
        );
    }

    fn render_toasts(&self, toasts: &[Toast]) {
        for toast in toasts {
            tracing::info!(
                target: "dashboard.view",
                toast_id = %toast.id,
                severity = ?toast.severity,
                message = %toast.message,
                "toast_visible"
            );
        }
    }
}
