use async_trait::async_trait;

use crate::{
    backend::types::{Scenario, WeatherReport},
    error::DashboardError,
};

/// Read side of the emergency backend consumed by the dashboard.
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    async fn fetch_scenarios(&self) -> Result<Vec<Scenario>, DashboardError>;

    async fn fetch_weather(&self, location: &str) -> Result<WeatherReport, DashboardError>;
}
