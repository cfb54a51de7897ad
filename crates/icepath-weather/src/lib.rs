//! icepath weather - historical weather provider client
//!
//! Fetches the single hourly observation the cost surface is penalised with.

pub mod client;
pub mod config;

pub use client::{observation_at_hour, ArchiveResponse, HourlySeries, WeatherClient};
pub use config::WeatherConfig;
