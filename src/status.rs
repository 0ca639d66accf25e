use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    backend::Scenario,
    storage::{EMERGENCY_STATUS_KEY, LocalStorage},
};

pub const CRITICAL_SEVERITY: &str = "Critical";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyStatus {
    #[default]
    Normal,
    Monitoring,
    Active,
}

impl EmergencyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Monitoring => "monitoring",
            Self::Active => "active",
        }
    }

    /// Restores the persisted status; anything unreadable falls back to normal.
    pub fn restore(storage: &dyn LocalStorage) -> Self {
        match storage.get_item(EMERGENCY_STATUS_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    target: "dashboard.status",
                    stored = %raw,
                    "emergency_status_corrupted"
                );
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(err) => {
                tracing::warn!(target: "dashboard.status", error = %err, "emergency_status_unreadable");
                Self::default()
            }
        }
    }
}

impl fmt::Display for EmergencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmergencyStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "normal" => Ok(Self::Normal),
            "monitoring" => Ok(Self::Monitoring),
            "active" => Ok(Self::Active),
            other => Err(format!("unknown emergency status '{other}'")),
        }
    }
}

pub fn derive_status(scenarios: &[Scenario]) -> EmergencyStatus {
    if scenarios
        .iter()
        .any(|scenario| scenario.severity == CRITICAL_SEVERITY)
    {
        EmergencyStatus::Active
    } else if !scenarios.is_empty() {
        EmergencyStatus::Monitoring
    } else {
        EmergencyStatus::Normal
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScenarioSummary {
    pub total: usize,
    pub critical: usize,
    pub by_severity: BTreeMap<String, usize>,
}

impl ScenarioSummary {
    pub fn from_scenarios(scenarios: &[Scenario]) -> Self {
        let mut by_severity = BTreeMap::new();
        for scenario in scenarios {
            *by_severity.entry(scenario.severity.clone()).or_insert(0) += 1;
        }

        Self {
            total: scenarios.len(),
            critical: by_severity.get(CRITICAL_SEVERITY).copied().unwrap_or(0),
            by_severity,
        }
    }
}
