//! Cost weights and weather penalty thresholds.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};

/// Configuration for one route planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub weights: CostWeights,
    pub weather: WeatherPenaltyConfig,
    /// Give up after expanding this many cells (None = unbounded)
    pub max_expansions: Option<usize>,
    pub anchor: PixelAnchor,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            weights: CostWeights::default(),
            weather: WeatherPenaltyConfig::default(),
            max_expansions: None,
            anchor: PixelAnchor::Corner,
        }
    }
}

impl RouteConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if self.max_expansions == Some(0) {
            return Err(RouteError::InvalidConfig(
                "max_expansions must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Linear weights applied by the cost surface combiner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    /// Multiplier on the ice base cost
    pub ice: f64,
    /// Multiplier on the wind/visibility scalar
    pub weather: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            ice: 10.0,
            weather: 1.0,
        }
    }
}

impl CostWeights {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("ice", self.ice), ("weather", self.weather)] {
            if !value.is_finite() || value < 0.0 {
                return Err(RouteError::InvalidConfig(format!(
                    "{} weight must be finite and >= 0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Thresholds for the weather penalty model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherPenaltyConfig {
    /// km/h per m/s
    pub kmh_per_mps: f64,
    /// Visibility below this (metres) is unsafe
    pub min_visibility_m: f64,
    pub low_visibility_penalty: f64,
    /// Thin ice turns brittle below this temperature (degrees C)
    pub cold_threshold_c: f64,
    pub cold_thin_ice_penalty: f64,
}

impl Default for WeatherPenaltyConfig {
    fn default() -> Self {
        Self {
            kmh_per_mps: 3.6,
            min_visibility_m: 500.0,
            low_visibility_penalty: 999_999.0,
            cold_threshold_c: -25.0,
            cold_thin_ice_penalty: 10.0,
        }
    }
}

/// Which point of a cell the projector reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelAnchor {
    /// Upper-left corner, i.e. the transform applied to (col, row) directly
    #[default]
    Corner,
    Center,
}
