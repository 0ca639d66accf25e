use serde::Serialize;

use crate::{backend::WeatherReport, format::weather_icon_key};

const MISSING: &str = "--";

/// Render-ready weather panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub temperature: String,
    pub description: String,
    pub wind: String,
    pub visibility: String,
    pub icon: &'static str,
    pub alerts: Vec<String>,
}

impl WeatherView {
    pub fn from_report(report: &WeatherReport) -> Self {
        Self {
            temperature: report
                .temperature
                .map(|value| format!("{}°F", value.round() as i64))
                .unwrap_or_else(|| MISSING.to_string()),
            description: report
                .description
                .clone()
                .or_else(|| report.condition.clone())
                .unwrap_or_else(|| MISSING.to_string()),
            wind: report
                .wind_speed
                .map(|value| format!("{value:.1} mph"))
                .unwrap_or_else(|| MISSING.to_string()),
            visibility: report
                .visibility
                .clone()
                .unwrap_or_else(|| MISSING.to_string()),
            icon: weather_icon_key(report.condition.as_deref().unwrap_or_default()),
            alerts: report.alerts.iter().map(|alert| alert.title.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    High,
    Severe,
    Catastrophic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvacuationDifficulty {
    Normal,
    Difficult,
    VeryDifficult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherImpact {
    pub level: ImpactLevel,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub evacuation_difficulty: EvacuationDifficulty,
}

/// Scores how current conditions affect response operations. Wind is in
/// mph, temperature in °F and visibility in miles.
pub fn assess_impact(report: &WeatherReport, incident_type: Option<&str>) -> WeatherImpact {
    let mut impact = WeatherImpact {
        level: ImpactLevel::Low,
        risk_factors: Vec::new(),
        recommendations: Vec::new(),
        evacuation_difficulty: EvacuationDifficulty::Normal,
    };
    let wind = report.wind_speed.unwrap_or(0.0);

    if wind > 25.0 {
        impact.level = ImpactLevel::High;
        impact
            .risk_factors
            .push("High winds may down power lines".to_string());
        impact
            .recommendations
            .push("Pre-position utility crews".to_string());
        impact.evacuation_difficulty = EvacuationDifficulty::Difficult;
    }

    if let Some(temperature) = report.temperature {
        if temperature < 32.0 {
            impact.risk_factors.push("Freezing temperatures".to_string());
            impact
                .recommendations
                .push("Activate warming centers".to_string());
        } else if temperature > 85.0 {
            impact.risk_factors.push("High heat conditions".to_string());
            impact
                .recommendations
                .push("Monitor for heat-related emergencies".to_string());
        }
    }

    if let Some(visibility) = report.visibility.as_deref().and_then(parse_leading_number)
        && visibility < 5.0
    {
        impact.level = ImpactLevel::High;
        impact
            .risk_factors
            .push("Low visibility conditions".to_string());
        impact
            .recommendations
            .push("Restrict non-essential travel".to_string());
        impact.evacuation_difficulty = EvacuationDifficulty::VeryDifficult;
    }

    if incident_type.is_some_and(|kind| kind.eq_ignore_ascii_case("hurricane")) {
        if wind > 74.0 {
            impact.level = ImpactLevel::Catastrophic;
            impact
                .recommendations
                .push("Immediate shelter in place".to_string());
        } else if wind > 39.0 {
            impact.level = ImpactLevel::Severe;
            impact
                .recommendations
                .push("Complete evacuations".to_string());
        }
    }

    impact
}

/// Numeric prefix of strings like "10 miles" or "2.5mi".
fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let end = text
        .char_indices()
        .find(|&(index, ch)| !(ch.is_ascii_digit() || ch == '.' || (index == 0 && ch == '-')))
        .map_or(text.len(), |(index, _)| index);
    text[..end].parse().ok()
}
