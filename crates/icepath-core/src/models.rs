//! Core data models for cost surfaces and routes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RouteError};
use crate::spatial::AffineTransform;

/// Ice chart category for one polygon or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainClass {
    Water,
    ThinIce,
    MediumIce,
    ThickIce,
    Land,
    /// Sensor recorded no backscatter
    NoData,
}

impl TerrainClass {
    pub const ALL: [TerrainClass; 6] = [
        TerrainClass::Water,
        TerrainClass::ThinIce,
        TerrainClass::MediumIce,
        TerrainClass::ThickIce,
        TerrainClass::Land,
        TerrainClass::NoData,
    ];

    /// Base traversal cost for entering a cell of this class.
    pub fn cost(self) -> CellCost {
        match self {
            TerrainClass::Water => CellCost::Finite(1.0),
            TerrainClass::ThinIce => CellCost::Finite(1.0),
            TerrainClass::MediumIce => CellCost::Finite(200.0),
            TerrainClass::ThickIce => CellCost::Finite(10_000.0),
            TerrainClass::Land | TerrainClass::NoData => CellCost::Impassable,
        }
    }

    /// Canonical chart label, as accepted by the classifier.
    pub fn label(self) -> &'static str {
        match self {
            TerrainClass::Water => "Water",
            TerrainClass::ThinIce => "Thin Ice",
            TerrainClass::MediumIce => "Medium Ice",
            TerrainClass::ThickIce => "Thick Ice",
            TerrainClass::Land => "Land",
            TerrainClass::NoData => "No Data",
        }
    }

    pub fn is_passable(self) -> bool {
        self.cost().is_traversable()
    }
}

/// Traversal cost of one cell. `Impassable` never takes part in arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellCost {
    Finite(f64),
    Impassable,
}

impl CellCost {
    pub fn is_traversable(self) -> bool {
        matches!(self, CellCost::Finite(_))
    }

    pub fn value(self) -> Option<f64> {
        match self {
            CellCost::Finite(value) => Some(value),
            CellCost::Impassable => None,
        }
    }
}

/// Row/column address of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridIndex {
    pub row: usize,
    pub col: usize,
}

impl GridIndex {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for GridIndex {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Row-major raster with a fixed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid<T>")]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

/// Unchecked wire form of [`Grid`].
#[derive(Deserialize)]
struct RawGrid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = RouteError;

    fn try_from(raw: RawGrid<T>) -> Result<Self> {
        Grid::from_vec(raw.rows, raw.cols, raw.cells)
    }
}

/// Base or total traversal cost per cell.
pub type CostGrid = Grid<CellCost>;

impl<T: Clone> Grid<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows.saturating_mul(cols)],
        }
    }
}

impl<T> Grid<T> {
    pub fn from_vec(rows: usize, cols: usize, cells: Vec<T>) -> Result<Self> {
        if cells.len() != rows.saturating_mul(cols) {
            return Err(RouteError::ShapeMismatch(format!(
                "{} cells supplied for a {}x{} grid",
                cells.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn contains(&self, index: GridIndex) -> bool {
        index.row < self.rows && index.col < self.cols
    }

    pub fn get(&self, index: GridIndex) -> Option<&T> {
        if !self.contains(index) {
            return None;
        }
        self.cells.get(self.offset(index))
    }

    pub fn get_mut(&mut self, index: GridIndex) -> Option<&mut T> {
        if !self.contains(index) {
            return None;
        }
        let offset = self.offset(index);
        self.cells.get_mut(offset)
    }

    /// Writes `value` at `index`; returns false when the index is out of bounds.
    pub fn set(&mut self, index: GridIndex, value: T) -> bool {
        match self.get_mut(index) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub(crate) fn offset(&self, index: GridIndex) -> usize {
        index.row * self.cols + index.col
    }

    pub(crate) fn index_of(&self, offset: usize) -> GridIndex {
        GridIndex {
            row: offset / self.cols.max(1),
            col: offset % self.cols.max(1),
        }
    }

    /// Cells paired with their index, in raster scan order.
    pub fn indexed(&self) -> impl Iterator<Item = (GridIndex, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(offset, cell)| (self.index_of(offset), cell))
    }

    /// Same shape, new contents. `cells` must hold `rows * cols` values.
    pub(crate) fn with_cells<U>(&self, cells: Vec<U>) -> Grid<U> {
        debug_assert_eq!(cells.len(), self.cells.len());
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        F: Fn(&T) -> U,
    {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl CostGrid {
    pub fn traversable_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_traversable()).count()
    }
}

/// Single-point weather reading for one hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub wind_speed_kmh: f64,
    #[serde(default)]
    pub visibility_m: Option<f64>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
}

/// Where and when to sample the weather provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
    pub date: NaiveDate,
    /// UTC hour, 0-23
    pub hour: u32,
}

/// Closed ring or polygon in the grid's projected coordinates, `[x, y]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Vec<[f64; 2]>,
    #[serde(default)]
    pub holes: Vec<Vec<[f64; 2]>>,
}

impl Polygon {
    pub fn new(exterior: Vec<[f64; 2]>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "polygons")]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Geometry::Polygon(polygon) => std::slice::from_ref(polygon),
            Geometry::MultiPolygon(polygons) => polygons,
        }
    }
}

/// One classified chart polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainPolygon {
    pub geometry: Geometry,
    pub class: TerrainClass,
}

/// Raster frame the cost surface is built on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    pub transform: AffineTransform,
    #[serde(default)]
    pub crs: Option<String>,
}

/// Least-cost cell sequence, start to end inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub cells: Vec<GridIndex>,
    pub weight: f64,
    pub nodes_visited: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialized_grid_must_match_its_shape() {
        let short = r#"{"rows":2,"cols":2,"cells":[{"finite":1.0},{"finite":1.0},{"finite":1.0}]}"#;
        assert!(serde_json::from_str::<CostGrid>(short).is_err());

        let full = r#"{"rows":1,"cols":2,"cells":[{"finite":1.0},"impassable"]}"#;
        let grid: CostGrid = serde_json::from_str(full).unwrap();
        assert_eq!(grid.shape(), (1, 2));
        assert_eq!(grid.get(GridIndex::new(0, 1)), Some(&CellCost::Impassable));
    }
}
