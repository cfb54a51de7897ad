//! Weighted merge of base cost and weather penalties into the total cost grid.

#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::error::{Result, RouteError};
use crate::models::{CellCost, CostGrid, Grid};
use crate::rules::CostWeights;

/// `ice * base + weather * weather_scalar + cell_penalty` for every cell.
///
/// Impassable cells stay impassable under any weight, zero included. A finite
/// cell whose weighted sum overflows is also reported impassable rather than
/// leaking a non-finite cost into the search.
pub fn combine(
    base: &CostGrid,
    weather_scalar: f64,
    cell_penalty: &Grid<f64>,
    weights: CostWeights,
) -> Result<CostGrid> {
    weights.validate()?;
    if base.shape() != cell_penalty.shape() {
        return Err(RouteError::ShapeMismatch(format!(
            "penalty grid is {}x{}, cost grid is {}x{}",
            cell_penalty.rows(),
            cell_penalty.cols(),
            base.rows(),
            base.cols()
        )));
    }
    if !weather_scalar.is_finite() {
        return Err(RouteError::InvalidConfig(format!(
            "weather penalty must be finite, got {}",
            weather_scalar
        )));
    }

    let weather_term = weights.weather * weather_scalar;
    let total = |(cell, penalty): (&CellCost, &f64)| match *cell {
        CellCost::Impassable => CellCost::Impassable,
        CellCost::Finite(cost) => {
            let value = weights.ice * cost + weather_term + penalty;
            if value.is_finite() {
                CellCost::Finite(value)
            } else {
                CellCost::Impassable
            }
        }
    };

    #[cfg(feature = "threading")]
    let cells: Vec<CellCost> = base
        .cells()
        .par_iter()
        .zip(cell_penalty.cells().par_iter())
        .map(total)
        .collect();
    #[cfg(not(feature = "threading"))]
    let cells: Vec<CellCost> = base
        .cells()
        .iter()
        .zip(cell_penalty.cells().iter())
        .map(total)
        .collect();

    let overflowed = base.traversable_count() - cells.iter().filter(|c| c.is_traversable()).count();
    if overflowed > 0 {
        tracing::warn!(overflowed, "Weighted cost overflowed; cells marked impassable");
    }

    Ok(base.with_cells(cells))
}
