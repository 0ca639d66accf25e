use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

impl Scenario {
    pub fn with_severity(severity: impl Into<String>) -> Self {
        Self {
            severity: severity.into(),
            scenario_id: None,
            incident_type: None,
            location: None,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Current conditions as served by the weather endpoint. Every field may be
/// absent; an alerts-only payload is still a valid report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "conditions")]
    pub condition: Option<String>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_visibility")]
    pub visibility: Option<String>,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

fn deserialize_visibility<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "visibility must be a string or number, got {other}"
        ))),
    }
}
