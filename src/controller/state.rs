use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    backend::{Scenario, WeatherReport},
    format::{abbreviate_number, format_relative_time_at},
    notifications::SeenSet,
    status::{CRITICAL_SEVERITY, EmergencyStatus, ScenarioSummary, derive_status},
    toast::Toast,
    weather::{WeatherImpact, WeatherView, assess_impact},
};

pub const ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub title: String,
    pub severity: String,
    pub location: Option<String>,
    pub when: Option<String>,
}

/// Immutable view handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub status: EmergencyStatus,
    pub summary: ScenarioSummary,
    pub total_label: String,
    pub activity: Vec<ActivityEntry>,
    pub weather: Option<WeatherView>,
    pub weather_impact: Option<WeatherImpact>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_data_refresh: Option<OffsetDateTime>,
    pub toasts: Vec<Toast>,
}

#[derive(Debug, Default)]
pub(crate) struct DashboardState {
    pub(crate) status: EmergencyStatus,
    pub(crate) summary: ScenarioSummary,
    pub(crate) activity: Vec<ActivityEntry>,
    pub(crate) weather: Option<WeatherReport>,
    pub(crate) lead_incident_type: Option<String>,
    pub(crate) last_data_refresh: Option<OffsetDateTime>,
    pub(crate) seen: SeenSet,
}

impl DashboardState {
    pub(crate) fn new(status: EmergencyStatus, seen: SeenSet) -> Self {
        Self {
            status,
            seen,
            ..Self::default()
        }
    }

    /// Recomputes status, counters and activity from a fresh scenario set.
    /// Returns the previous status.
    pub(crate) fn apply_scenarios(
        &mut self,
        scenarios: &[Scenario],
        now: OffsetDateTime,
    ) -> EmergencyStatus {
        let previous = self.status;
        self.status = derive_status(scenarios);
        self.summary = ScenarioSummary::from_scenarios(scenarios);
        self.activity = recent_activity(scenarios, now);
        self.lead_incident_type = scenarios
            .iter()
            .find(|scenario| scenario.severity == CRITICAL_SEVERITY)
            .and_then(|scenario| scenario.incident_type.clone());
        self.last_data_refresh = Some(now);
        previous
    }

    pub(crate) fn apply_weather(&mut self, report: WeatherReport) {
        self.weather = Some(report);
    }

    pub(crate) fn snapshot(&self, toasts: Vec<Toast>) -> DashboardSnapshot {
        DashboardSnapshot {
            status: self.status,
            summary: self.summary.clone(),
            total_label: abbreviate_number(self.summary.total as u64),
            activity: self.activity.clone(),
            weather: self.weather.as_ref().map(WeatherView::from_report),
            weather_impact: self
                .weather
                .as_ref()
                .map(|report| assess_impact(report, self.lead_incident_type.as_deref())),
            last_data_refresh: self.last_data_refresh,
            toasts,
        }
    }
}

fn recent_activity(scenarios: &[Scenario], now: OffsetDateTime) -> Vec<ActivityEntry> {
    let mut ordered: Vec<&Scenario> = scenarios.iter().collect();
    // newest first, undated scenarios keep their backend order at the end
    ordered.sort_by(|left, right| right.created_at.cmp(&left.created_at));

    ordered
        .into_iter()
        .take(ACTIVITY_LIMIT)
        .map(|scenario| ActivityEntry {
            title: scenario
                .incident_type
                .clone()
                .or_else(|| scenario.scenario_id.clone())
                .unwrap_or_else(|| "Scenario".to_string()),
            severity: scenario.severity.clone(),
            location: scenario.location.clone(),
            when: scenario
                .created_at
                .map(|created_at| format_relative_time_at(created_at, now)),
        })
        .collect()
}
