//! Grid index path to projected coordinates.

use crate::models::GridIndex;
use crate::rules::PixelAnchor;
use crate::spatial::AffineTransform;

/// Map each cell of `path` into the grid's projected CRS, preserving order.
pub fn project_path(
    path: &[GridIndex],
    transform: &AffineTransform,
    anchor: PixelAnchor,
) -> Vec<[f64; 2]> {
    path.iter()
        .map(|index| match anchor {
            PixelAnchor::Corner => transform.cell_corner(*index),
            PixelAnchor::Center => transform.cell_center(*index),
        })
        .collect()
}
