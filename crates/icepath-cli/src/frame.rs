//! Raster frame descriptor: the grid geometry a chart is burned into.
//!
//! ```json
//! {"rows": 400, "cols": 600, "transform": [a, b, c, d, e, f],
//!  "crs": "EPSG:3413", "no_data": [[0, 0], [0, 1]]}
//! ```

use std::path::Path;

use anyhow::Context;
use icepath_core::{AffineTransform, Grid, GridIndex, GridSpec, Result, RouteError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterDescriptor {
    pub rows: usize,
    pub cols: usize,
    pub transform: AffineTransform,
    #[serde(default)]
    pub crs: Option<String>,
    /// Cells the source raster marks as nodata, as `[row, col]`
    #[serde(default)]
    pub no_data: Vec<[usize; 2]>,
}

impl RasterDescriptor {
    pub fn grid_spec(&self) -> GridSpec {
        GridSpec {
            rows: self.rows,
            cols: self.cols,
            transform: self.transform,
            crs: self.crs.clone(),
        }
    }

    /// `None` when the raster declares no nodata cells.
    pub fn no_data_mask(&self) -> Result<Option<Grid<bool>>> {
        if self.no_data.is_empty() {
            return Ok(None);
        }
        let mut mask = Grid::filled(self.rows, self.cols, false);
        for &[row, col] in &self.no_data {
            let index = GridIndex::new(row, col);
            if !mask.set(index, true) {
                return Err(RouteError::ShapeMismatch(format!(
                    "nodata cell {} outside {}x{} raster",
                    index, self.rows, self.cols
                )));
            }
        }
        Ok(Some(mask))
    }
}

pub fn load_frame(path: &Path) -> anyhow::Result<RasterDescriptor> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let descriptor: RasterDescriptor = serde_json::from_str(&text)
        .with_context(|| format!("parsing raster descriptor {}", path.display()))?;
    tracing::info!(
        rows = descriptor.rows,
        cols = descriptor.cols,
        crs = ?descriptor.crs,
        no_data = descriptor.no_data.len(),
        "Raster frame loaded"
    );
    Ok(descriptor)
}
