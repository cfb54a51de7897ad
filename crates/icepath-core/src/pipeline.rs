//! End-to-end route planning: chart polygons and one weather reading in,
//! projected least-cost line out.

use serde::{Deserialize, Serialize};

use crate::combine::combine;
use crate::error::{Result, RouteError};
use crate::models::{
    CostGrid, Grid, GridIndex, GridSpec, PathResult, TerrainClass, TerrainPolygon,
    WeatherObservation,
};
use crate::projector::project_path;
use crate::raster::build_cost_grid;
use crate::route_engine::find_path_bounded;
use crate::rules::RouteConfig;
use crate::spatial::is_geographic_crs;
use crate::weather::{cell_penalty, scalar_penalty};

/// How the route's start and end cells are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum EndpointPolicy {
    /// First and last open-water cells in raster scan order
    #[default]
    FirstLastOpenWater,
    Explicit { start: GridIndex, end: GridIndex },
}

/// Everything one planning run consumes.
#[derive(Debug, Clone, Copy)]
pub struct RouteInputs<'a> {
    pub terrain: &'a [TerrainPolygon],
    pub terrain_crs: Option<&'a str>,
    pub frame: &'a GridSpec,
    pub no_data_mask: Option<&'a Grid<bool>>,
    pub observation: &'a WeatherObservation,
    pub endpoints: EndpointPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub start: GridIndex,
    pub end: GridIndex,
    pub path: PathResult,
    /// Path vertices in the frame's CRS
    pub coordinates: Vec<[f64; 2]>,
    pub crs: Option<String>,
    pub weather_penalty: f64,
    pub cold_penalty_cells: usize,
}

pub fn plan_route(inputs: &RouteInputs<'_>, config: &RouteConfig) -> Result<RoutePlan> {
    config.validate()?;

    let base = build_cost_grid(
        inputs.terrain,
        inputs.terrain_crs,
        inputs.frame,
        inputs.no_data_mask,
    )?;
    tracing::info!(
        rows = base.rows(),
        cols = base.cols(),
        traversable = base.traversable_count(),
        "Ice cost surface ready"
    );

    let weather_penalty = scalar_penalty(inputs.observation, &config.weather);
    let penalty_grid = cell_penalty(inputs.observation, &base, &config.weather);
    let cold_penalty_cells = penalty_grid.cells().iter().filter(|v| **v > 0.0).count();
    tracing::info!(
        wind_kmh = inputs.observation.wind_speed_kmh,
        visibility_m = ?inputs.observation.visibility_m,
        temperature_c = ?inputs.observation.temperature_c,
        weather_penalty,
        cold_penalty_cells,
        "Weather penalties computed"
    );

    let total = combine(&base, weather_penalty, &penalty_grid, config.weights)?;

    let (start, end) = match inputs.endpoints {
        EndpointPolicy::FirstLastOpenWater => select_endpoints(&base)?,
        EndpointPolicy::Explicit { start, end } => (start, end),
    };
    tracing::info!(%start, %end, "Searching for least-cost route");

    let path = find_path_bounded(&total, start, end, config.max_expansions)?;
    let coordinates = project_path(&path.cells, &inputs.frame.transform, config.anchor);

    tracing::info!(
        weight = path.weight,
        cells = path.cells.len(),
        nodes_visited = path.nodes_visited,
        "Route planned"
    );

    Ok(RoutePlan {
        start,
        end,
        path,
        coordinates,
        crs: inputs.frame.crs.clone(),
        weather_penalty,
        cold_penalty_cells,
    })
}

/// First and last open-water cells of the base grid in raster scan order.
///
/// This is a caller policy, not part of the search contract: it depends on
/// scan order and says nothing about sensible entry or exit points.
pub fn select_endpoints(base: &CostGrid) -> Result<(GridIndex, GridIndex)> {
    let open_water = TerrainClass::Water.cost();
    let mut matches = base
        .indexed()
        .filter(|(_, cell)| **cell == open_water)
        .map(|(index, _)| index);

    let first = matches.next();
    let mut walkable = usize::from(first.is_some());
    let mut last = None;
    for index in matches {
        walkable += 1;
        last = Some(index);
    }

    match (first, last) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(RouteError::InsufficientWalkableCells { walkable }),
    }
}

/// `(lat, lon)` of the grid centre when the frame is already in degrees.
pub fn grid_center_lat_lon(frame: &GridSpec) -> Option<(f64, f64)> {
    let crs = frame.crs.as_deref()?;
    if !is_geographic_crs(crs) {
        return None;
    }
    let [lon, lat] = frame
        .transform
        .apply(frame.cols as f64 / 2.0, frame.rows as f64 / 2.0);
    Some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellCost;
    use crate::spatial::AffineTransform;

    #[test]
    fn endpoints_are_first_and_last_open_water() {
        let grid = Grid::from_vec(
            2,
            3,
            vec![
                CellCost::Impassable,
                CellCost::Finite(1.0),
                CellCost::Finite(200.0),
                CellCost::Finite(1.0),
                CellCost::Finite(1.0),
                CellCost::Finite(10_000.0),
            ],
        )
        .unwrap();
        assert_eq!(
            select_endpoints(&grid).unwrap(),
            (GridIndex::new(0, 1), GridIndex::new(1, 1))
        );
    }

    #[test]
    fn fewer_than_two_open_water_cells_is_an_error() {
        let mut grid = Grid::filled(2, 2, CellCost::Finite(200.0));
        assert_eq!(
            select_endpoints(&grid).unwrap_err(),
            RouteError::InsufficientWalkableCells { walkable: 0 }
        );
        grid.set(GridIndex::new(1, 0), CellCost::Finite(1.0));
        assert_eq!(
            select_endpoints(&grid).unwrap_err(),
            RouteError::InsufficientWalkableCells { walkable: 1 }
        );
    }

    #[test]
    fn center_only_for_geographic_frames() {
        let mut frame = GridSpec {
            rows: 10,
            cols: 20,
            transform: AffineTransform::north_up(-40.0, 80.0, 0.5, 0.25),
            crs: Some("EPSG:4326".to_string()),
        };
        assert_eq!(grid_center_lat_lon(&frame), Some((78.75, -35.0)));
        frame.crs = Some("EPSG:3413".to_string());
        assert_eq!(grid_center_lat_lon(&frame), None);
        frame.crs = None;
        assert_eq!(grid_center_lat_lon(&frame), None);
    }
}
