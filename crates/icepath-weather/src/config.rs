//! Weather provider configuration from environment.

use std::env;
use std::time::Duration;

pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub provider_url: String,
    pub request_timeout_s: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            provider_url: DEFAULT_ARCHIVE_URL.to_string(),
            request_timeout_s: 15,
        }
    }
}

impl WeatherConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider_url: env::var("ICEPATH_WEATHER_URL").unwrap_or(defaults.provider_url),
            request_timeout_s: env::var("ICEPATH_WEATHER_TIMEOUT_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_s),
        }
    }

    /// Request deadline, never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s.max(1))
    }
}
