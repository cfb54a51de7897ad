//! Open-Meteo archive API client.

use chrono::{NaiveDateTime, Timelike};
use icepath_core::{Result, RouteError, WeatherObservation, WeatherQuery};
use reqwest::Client;
use serde::Deserialize;

use crate::config::WeatherConfig;

const HOURLY_VARIABLES: &str = "temperature_2m,visibility,wind_speed_10m";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
pub struct ArchiveResponse {
    pub hourly: Option<HourlySeries>,
}

/// Column-oriented hourly values; any sample may be null.
#[derive(Debug, Default, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub visibility: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
}

/// HTTP client for the weather archive. One request per run, no retries.
pub struct WeatherClient {
    client: Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| RouteError::WeatherFetch(format!("client setup: {}", err)))?;
        Ok(Self { client, config })
    }

    /// Fetch the observation for `query.hour` (UTC) on `query.date` at one point.
    pub async fn fetch_observation(&self, query: &WeatherQuery) -> Result<WeatherObservation> {
        validate_query(query)?;
        if self.config.provider_url.trim().is_empty() {
            return Err(RouteError::WeatherFetch(
                "weather provider URL is empty".to_string(),
            ));
        }

        let date = query.date.format("%Y-%m-%d").to_string();
        let latitude = format!("{:.6}", query.lat);
        let longitude = format!("{:.6}", query.lon);
        tracing::info!(
            lat = query.lat,
            lon = query.lon,
            %date,
            hour = query.hour,
            "Fetching weather observation"
        );

        let response = self
            .client
            .get(&self.config.provider_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("start_date", date.as_str()),
                ("end_date", date.as_str()),
                ("hourly", HOURLY_VARIABLES),
                ("timezone", "UTC"),
            ])
            .send()
            .await
            .map_err(|err| RouteError::WeatherFetch(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RouteError::WeatherFetch(format!(
                "weather provider HTTP {} {}",
                status,
                body.trim()
            )));
        }

        let payload: ArchiveResponse = response
            .json()
            .await
            .map_err(|err| RouteError::WeatherFetch(format!("bad weather payload: {}", err)))?;
        let hourly = payload.hourly.ok_or_else(|| {
            RouteError::WeatherFetch("weather provider returned no hourly data".to_string())
        })?;

        let observation = observation_at_hour(&hourly, query.hour)?;
        tracing::debug!(?observation, "Weather observation selected");
        Ok(observation)
    }
}

fn validate_query(query: &WeatherQuery) -> Result<()> {
    if !query.lat.is_finite() || !(-90.0..=90.0).contains(&query.lat) {
        return Err(RouteError::InvalidConfig(format!(
            "latitude out of range: {}",
            query.lat
        )));
    }
    if !query.lon.is_finite() || !(-180.0..=180.0).contains(&query.lon) {
        return Err(RouteError::InvalidConfig(format!(
            "longitude out of range: {}",
            query.lon
        )));
    }
    if query.hour > 23 {
        return Err(RouteError::InvalidConfig(format!(
            "hour must be 0-23, got {}",
            query.hour
        )));
    }
    Ok(())
}

/// First sample whose timestamp falls in `hour`. Wind speed is required;
/// visibility and temperature may be missing.
pub fn observation_at_hour(hourly: &HourlySeries, hour: u32) -> Result<WeatherObservation> {
    let position = hourly
        .time
        .iter()
        .position(|stamp| {
            NaiveDateTime::parse_from_str(stamp, TIME_FORMAT)
                .map(|time| time.hour() == hour)
                .unwrap_or(false)
        })
        .ok_or_else(|| {
            RouteError::WeatherFetch(format!("no weather sample for hour {:02}:00", hour))
        })?;

    let wind_speed_kmh = sample(&hourly.wind_speed_10m, position).ok_or_else(|| {
        RouteError::WeatherFetch(format!("no wind speed at {}", hourly.time[position]))
    })?;

    Ok(WeatherObservation {
        wind_speed_kmh,
        visibility_m: sample(&hourly.visibility, position),
        temperature_c: sample(&hourly.temperature_2m, position),
    })
}

fn sample(series: &[Option<f64>], position: usize) -> Option<f64> {
    series
        .get(position)
        .copied()
        .flatten()
        .filter(|value| value.is_finite())
}
