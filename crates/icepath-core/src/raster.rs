//! Burns classified chart polygons into a base cost grid.

use crate::error::{Result, RouteError};
use crate::models::{CostGrid, Grid, GridIndex, GridSpec, Polygon, TerrainClass, TerrainPolygon};
use crate::spatial::{polygon_bounds, polygon_contains, polygon_is_finite, same_crs, Bounds};

/// Build the base cost grid for `spec`.
///
/// Every cell starts as open water. Polygons are burned in input order, so a
/// later polygon overwrites an earlier one where they overlap; a cell is
/// covered when its centre lies inside the polygon. Cells flagged in
/// `no_data_mask` are then forced impassable regardless of coverage.
///
/// Reprojection is the caller's job. This only checks that what it was given
/// lines up with the grid.
pub fn build_cost_grid(
    polygons: &[TerrainPolygon],
    vector_crs: Option<&str>,
    spec: &GridSpec,
    no_data_mask: Option<&Grid<bool>>,
) -> Result<CostGrid> {
    validate_alignment(polygons, vector_crs, spec, no_data_mask)?;

    let mut grid = Grid::filled(spec.rows, spec.cols, TerrainClass::Water.cost());
    let mut burned = 0usize;
    for terrain in polygons {
        let cost = terrain.class.cost();
        for polygon in terrain.geometry.polygons() {
            burned += burn_polygon(&mut grid, spec, polygon, |cell| *cell = cost);
        }
    }

    let mut masked = 0usize;
    if let Some(mask) = no_data_mask {
        let no_data = TerrainClass::NoData.cost();
        for (index, flagged) in mask.indexed() {
            if *flagged && grid.set(index, no_data) {
                masked += 1;
            }
        }
    }

    tracing::debug!(
        rows = spec.rows,
        cols = spec.cols,
        polygons = polygons.len(),
        burned,
        masked,
        "Base cost grid built"
    );

    Ok(grid)
}

fn validate_alignment(
    polygons: &[TerrainPolygon],
    vector_crs: Option<&str>,
    spec: &GridSpec,
    no_data_mask: Option<&Grid<bool>>,
) -> Result<()> {
    if spec.rows == 0 || spec.cols == 0 {
        return Err(RouteError::ShapeMismatch(format!(
            "grid has an empty dimension ({}x{})",
            spec.rows, spec.cols
        )));
    }
    if !spec.transform.is_invertible() {
        return Err(RouteError::ShapeMismatch(
            "grid transform is degenerate".to_string(),
        ));
    }
    if let Some(mask) = no_data_mask {
        if mask.shape() != (spec.rows, spec.cols) {
            return Err(RouteError::ShapeMismatch(format!(
                "no-data mask is {}x{}, grid is {}x{}",
                mask.rows(),
                mask.cols(),
                spec.rows,
                spec.cols
            )));
        }
    }
    if let (Some(vector), Some(raster)) = (vector_crs, spec.crs.as_deref()) {
        if !same_crs(vector, raster) {
            return Err(RouteError::ShapeMismatch(format!(
                "terrain CRS {} does not match grid CRS {}",
                vector, raster
            )));
        }
    }

    let mut extent: Option<Bounds> = None;
    for (idx, terrain) in polygons.iter().enumerate() {
        for polygon in terrain.geometry.polygons() {
            if !polygon_is_finite(polygon) {
                return Err(RouteError::ShapeMismatch(format!(
                    "terrain polygon {} has non-finite coordinates",
                    idx
                )));
            }
            if let Some(bounds) = polygon_bounds(polygon) {
                extent = Some(match extent {
                    Some(current) => current.union(&bounds),
                    None => bounds,
                });
            }
        }
    }

    if let Some(extent) = extent {
        let grid_extent = spec.transform.grid_extent(spec.rows, spec.cols);
        if !extent.intersects(&grid_extent) {
            return Err(RouteError::ShapeMismatch(format!(
                "terrain extent {:?} lies outside grid extent {:?}",
                extent.to_array(),
                grid_extent.to_array()
            )));
        }
    }

    Ok(())
}

/// Applies `write` to every cell whose centre is inside `polygon`; returns the
/// number of cells written.
fn burn_polygon<T, F>(grid: &mut Grid<T>, spec: &GridSpec, polygon: &Polygon, mut write: F) -> usize
where
    F: FnMut(&mut T),
{
    let Some(window) = pixel_window(spec, polygon) else {
        return 0;
    };

    let mut written = 0usize;
    for row in window.row_min..=window.row_max {
        for col in window.col_min..=window.col_max {
            let index = GridIndex::new(row, col);
            let [x, y] = spec.transform.cell_center(index);
            if !polygon_contains(polygon, x, y) {
                continue;
            }
            if let Some(cell) = grid.get_mut(index) {
                write(cell);
                written += 1;
            }
        }
    }
    written
}

struct PixelWindow {
    row_min: usize,
    row_max: usize,
    col_min: usize,
    col_max: usize,
}

/// Grid cells whose centres could fall inside the polygon's bounding box.
fn pixel_window(spec: &GridSpec, polygon: &Polygon) -> Option<PixelWindow> {
    let bounds = polygon_bounds(polygon)?;
    let corners = [
        [bounds.min_x, bounds.min_y],
        [bounds.min_x, bounds.max_y],
        [bounds.max_x, bounds.min_y],
        [bounds.max_x, bounds.max_y],
    ];

    let mut col_lo = f64::INFINITY;
    let mut col_hi = f64::NEG_INFINITY;
    let mut row_lo = f64::INFINITY;
    let mut row_hi = f64::NEG_INFINITY;
    for [x, y] in corners {
        let (col, row) = spec.transform.invert(x, y)?;
        col_lo = col_lo.min(col);
        col_hi = col_hi.max(col);
        row_lo = row_lo.min(row);
        row_hi = row_hi.max(row);
    }

    let col_range = clamp_range(col_lo, col_hi, spec.cols)?;
    let row_range = clamp_range(row_lo, row_hi, spec.rows)?;
    Some(PixelWindow {
        row_min: row_range.0,
        row_max: row_range.1,
        col_min: col_range.0,
        col_max: col_range.1,
    })
}

/// Cell indices whose centre (`i + 0.5`) may lie in `[lo, hi]`, clamped to `0..len`.
fn clamp_range(lo: f64, hi: f64, len: usize) -> Option<(usize, usize)> {
    let first = (lo - 0.5).floor().max(0.0);
    let last = (hi - 0.5).ceil().min(len as f64 - 1.0);
    if !first.is_finite() || !last.is_finite() || last < first {
        return None;
    }
    Some((first as usize, last as usize))
}
