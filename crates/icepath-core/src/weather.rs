//! Weather penalty model.
//!
//! Wind and visibility act as path-independent scalars applied uniformly to
//! every traversable cell. Temperature acts only on cells whose base cost is
//! the thin-ice cost.

#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::models::{CellCost, CostGrid, Grid, TerrainClass, WeatherObservation};
use crate::rules::WeatherPenaltyConfig;

/// Quadratic wind-drag term plus a dominating low-visibility penalty.
pub fn scalar_penalty(obs: &WeatherObservation, config: &WeatherPenaltyConfig) -> f64 {
    let wind_mps = obs.wind_speed_kmh / config.kmh_per_mps;
    let wind = wind_mps * wind_mps;
    let visibility = match obs.visibility_m {
        Some(visibility) if visibility < config.min_visibility_m => config.low_visibility_penalty,
        _ => 0.0,
    };
    wind + visibility
}

/// Per-cell penalty: zero everywhere unless it is colder than the threshold,
/// in which case thin-ice-cost cells get the brittle-ice penalty.
pub fn cell_penalty(
    obs: &WeatherObservation,
    base: &CostGrid,
    config: &WeatherPenaltyConfig,
) -> Grid<f64> {
    let cold = obs
        .temperature_c
        .is_some_and(|temp| temp < config.cold_threshold_c);
    if !cold {
        return Grid::filled(base.rows(), base.cols(), 0.0);
    }

    let thin_ice = TerrainClass::ThinIce.cost();
    let penalty = config.cold_thin_ice_penalty;
    let per_cell = |cell: &CellCost| match cell {
        CellCost::Finite(_) if *cell == thin_ice => penalty,
        _ => 0.0,
    };

    #[cfg(feature = "threading")]
    let cells: Vec<f64> = base.cells().par_iter().map(per_cell).collect();
    #[cfg(not(feature = "threading"))]
    let cells: Vec<f64> = base.cells().iter().map(per_cell).collect();

    let penalised = cells.iter().filter(|value| **value != 0.0).count();
    tracing::debug!(penalised, "Cold penalty applied to thin-ice cells");

    base.with_cells(cells)
}
