pub mod http;
pub mod ports;
pub mod types;

pub use http::HttpDashboardBackend;
pub use ports::DashboardBackend;
pub use types::{Scenario, WeatherAlert, WeatherReport};
