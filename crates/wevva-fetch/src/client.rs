//! OpenWeatherMap One Call client.

use reqwest::Client;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use wevva_types::TemperatureRecord;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// How far back the yesterday request reaches.
pub const YESTERDAY_OFFSET: Duration = Duration::days(1);

/// Error type for weather requests.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be decoded.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Result type for weather requests.
pub type Result<T> = std::result::Result<T, FetchError>;

/// The part of a One Call response this client reads.
#[derive(Debug, Deserialize)]
struct OneCallResponse {
    #[serde(default)]
    hourly: Vec<HourlyWeather>,
}

#[derive(Debug, Deserialize)]
struct HourlyWeather {
    dt: i64,
    /// Kelvin.
    feels_like: f64,
}

/// Client for hourly feels-like temperatures at one location.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    lat: f64,
    lon: f64,
}

impl WeatherClient {
    /// Create a client for the given location.
    pub fn new(api_key: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            lat,
            lon,
        }
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// URL of the forecast request covering today.
    pub fn today_url(&self) -> String {
        format!(
            "{}/onecall?lat={}&lon={}&exclude=minutely,daily,alerts&appid={}",
            self.base_url, self.lat, self.lon, self.api_key
        )
    }

    /// URL of the historical request for the given Unix time.
    pub fn history_url(&self, at: i64) -> String {
        format!(
            "{}/onecall/timemachine?lat={}&lon={}&dt={}&appid={}",
            self.base_url, self.lat, self.lon, at, self.api_key
        )
    }

    /// Hourly temperatures for today.
    pub async fn today(&self) -> Result<Vec<TemperatureRecord>> {
        self.hourly(&self.today_url()).await
    }

    /// Hourly temperatures for the day before `now`.
    pub async fn yesterday(&self, now: OffsetDateTime) -> Result<Vec<TemperatureRecord>> {
        let at = (now - YESTERDAY_OFFSET).unix_timestamp();
        self.hourly(&self.history_url(at)).await
    }

    async fn hourly(&self, url: &str) -> Result<Vec<TemperatureRecord>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: OneCallResponse = response.json().await?;
        Ok(to_records(body))
    }
}

fn to_records(response: OneCallResponse) -> Vec<TemperatureRecord> {
    response
        .hourly
        .into_iter()
        .map(|h| TemperatureRecord::from_kelvin(h.dt, h.feels_like))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> WeatherClient {
        WeatherClient::new("secret", 51.5074, 0.1278)
    }

    #[test]
    fn test_today_url() {
        assert_eq!(
            client().today_url(),
            "https://api.openweathermap.org/data/2.5/onecall?lat=51.5074&lon=0.1278\
             &exclude=minutely,daily,alerts&appid=secret"
        );
    }

    #[test]
    fn test_history_url() {
        assert_eq!(
            client().history_url(1_700_000_000),
            "https://api.openweathermap.org/data/2.5/onecall/timemachine?lat=51.5074&lon=0.1278\
             &dt=1700000000&appid=secret"
        );
    }

    #[test]
    fn test_base_url_override() {
        let client = client().with_base_url("http://localhost:9000/");
        assert!(client.today_url().starts_with("http://localhost:9000/onecall?"));
    }

    #[test]
    fn test_hourly_to_celsius() {
        let json = r#"{
            "lat": 51.5074,
            "current": {"dt": 1, "temp": 280.0},
            "hourly": [
                {"dt": 1700000000, "temp": 281.0, "feels_like": 273.15},
                {"dt": 1700003600, "temp": 282.0, "feels_like": 283.65}
            ]
        }"#;
        let response: OneCallResponse = serde_json::from_str(json).unwrap();
        let records = to_records(response);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, 1_700_000_000);
        assert!(records[0].feels_like_celsius.abs() < 1e-9);
        assert!((records[1].feels_like_celsius - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_hourly_is_empty() {
        let response: OneCallResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(to_records(response).is_empty());
    }
}
