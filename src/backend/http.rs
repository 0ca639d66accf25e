use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::{Duration, timeout};

use crate::{
    backend::{
        ports::DashboardBackend,
        types::{Scenario, WeatherReport},
    },
    config::BackendConfig,
    error::{DashboardError, network_failure, parse_failure},
};

const SCENARIOS_PATH: &str = "api/scenarios";
const WEATHER_PATH: &str = "api/weather";

pub struct HttpDashboardBackend {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpDashboardBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, DashboardError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|err| parse_failure(format!("invalid backend base_url '{}': {err}", config.base_url)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(parse_failure(format!(
                "unsupported backend scheme '{}'",
                base_url.scheme()
            )));
        }

        // endpoint paths are relative, so a path prefix must end in '/'
        if !base_url.path().ends_with('/') {
            let prefixed = format!("{}/", base_url.path());
            base_url.set_path(&prefixed);
        }

        let client = Client::builder()
            .no_proxy()
            .build()
            .map_err(|err| network_failure(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            base_url,
            timeout: Duration::from_millis(config.timeout_ms.max(1)),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, DashboardError> {
        self.base_url
            .join(path)
            .map_err(|err| parse_failure(format!("invalid endpoint path '{path}': {err}")))
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, DashboardError> {
        let url = self.endpoint(path)?;

        let request = self.client.get(url.clone()).query(query);
        let response = match timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(network_failure(format!("GET {url} failed: {err}"))),
            Err(_) => return Err(network_failure(format!("GET {url} timed out"))),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(network_failure(format!(
                "GET {url} returned status {}",
                status.as_u16()
            )));
        }

        let body = match timeout(self.timeout, response.bytes()).await {
            Ok(Ok(body)) => body,
            Ok(Err(err)) => return Err(network_failure(format!("GET {url} body read failed: {err}"))),
            Err(_) => return Err(network_failure(format!("GET {url} body read timed out"))),
        };

        serde_json::from_slice(&body)
            .map_err(|err| parse_failure(format!("GET {url} returned invalid json: {err}")))
    }
}

#[async_trait]
impl DashboardBackend for HttpDashboardBackend {
    #[tracing::instrument(name = "backend_fetch_scenarios", target = "dashboard.backend", skip(self))]
    async fn fetch_scenarios(&self) -> Result<Vec<Scenario>, DashboardError> {
        let value = self.get_json(SCENARIOS_PATH, &[]).await?;
        decode_payload(value, "scenarios")
    }

    #[tracing::instrument(name = "backend_fetch_weather", target = "dashboard.backend", skip(self))]
    async fn fetch_weather(&self, location: &str) -> Result<WeatherReport, DashboardError> {
        let value = self.get_json(WEATHER_PATH, &[("location", location)]).await?;
        decode_payload(value, "weather")
    }
}

/// Accepts a bare payload or a `{success, <key>: payload}` envelope.
/// `success: false` is reported as a network failure carrying `error`.
pub(crate) fn decode_payload<T: DeserializeOwned>(
    value: Value,
    envelope_key: &str,
) -> Result<T, DashboardError> {
    let payload = match value {
        Value::Object(mut object) => {
            if object.get("success").and_then(Value::as_bool) == Some(false) {
                let reason = object
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("backend reported failure")
                    .to_string();
                return Err(network_failure(reason));
            }
            match object.remove(envelope_key) {
                Some(inner) => inner,
                None => Value::Object(object),
            }
        }
        other => other,
    };

    serde_json::from_value(payload)
        .map_err(|err| parse_failure(format!("unexpected {envelope_key} payload: {err}")))
}
