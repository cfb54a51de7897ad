//! Planar geometry for rasterisation and georeferencing.

use serde::{Deserialize, Serialize};

use crate::models::{GridIndex, Polygon};

/// Affine map from (col, row) raster space into projected coordinates:
/// `x = a*col + b*row + c`, `y = d*col + e*row + f`.
///
/// Serialises as `[a, b, c, d, e, f]`, the order raster libraries print it in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl From<[f64; 6]> for AffineTransform {
    fn from([a, b, c, d, e, f]: [f64; 6]) -> Self {
        Self { a, b, c, d, e, f }
    }
}

impl From<AffineTransform> for [f64; 6] {
    fn from(t: AffineTransform) -> Self {
        [t.a, t.b, t.c, t.d, t.e, t.f]
    }
}

impl AffineTransform {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform with square-ish pixels anchored at the top-left corner.
    pub const fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new(pixel_width, 0.0, origin_x, 0.0, -pixel_height, origin_y)
    }

    /// Build from a GDAL geotransform `[c, a, b, f, d, e]`.
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self::new(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    pub fn apply(&self, col: f64, row: f64) -> [f64; 2] {
        [
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        ]
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    pub fn is_invertible(&self) -> bool {
        let finite = [self.a, self.b, self.c, self.d, self.e, self.f]
            .iter()
            .all(|value| value.is_finite());
        finite && self.determinant().abs() > f64::EPSILON * 1e-6
    }

    /// Fractional (col, row) for a projected point, or None for a degenerate transform.
    pub fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !self.is_invertible() {
            return None;
        }
        let det = self.determinant();
        let dx = x - self.c;
        let dy = y - self.f;
        let col = (self.e * dx - self.b * dy) / det;
        let row = (-self.d * dx + self.a * dy) / det;
        Some((col, row))
    }

    pub fn cell_center(&self, index: GridIndex) -> [f64; 2] {
        self.apply(index.col as f64 + 0.5, index.row as f64 + 0.5)
    }

    pub fn cell_corner(&self, index: GridIndex) -> [f64; 2] {
        self.apply(index.col as f64, index.row as f64)
    }

    /// Projected extent covered by a `rows x cols` grid.
    pub fn grid_extent(&self, rows: usize, cols: usize) -> Bounds {
        let (rows, cols) = (rows as f64, cols as f64);
        Bounds::from_points(
            [
                self.apply(0.0, 0.0),
                self.apply(cols, 0.0),
                self.apply(0.0, rows),
                self.apply(cols, rows),
            ]
            .iter(),
        )
        .unwrap_or(Bounds::EMPTY)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    };

    /// Bounds of the finite points; None when there are none.
    pub fn from_points<'a, I>(points: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = &'a [f64; 2]>,
    {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for [x, y] in points {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            min_x = min_x.min(*x);
            min_y = min_y.min(*y);
            max_x = max_x.max(*x);
            max_y = max_y.max(*y);
        }
        if !min_x.is_finite() || !min_y.is_finite() {
            return None;
        }
        Some(Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Closed-interval overlap test; touching edges count.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

/// Even-odd ray casting against one ring. Points exactly on an edge may land
/// on either side.
pub fn ring_contains(ring: &[[f64; 2]], x: f64, y: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Inside the exterior ring and outside every hole.
pub fn polygon_contains(polygon: &Polygon, x: f64, y: f64) -> bool {
    if !ring_contains(&polygon.exterior, x, y) {
        return false;
    }
    !polygon.holes.iter().any(|hole| ring_contains(hole, x, y))
}

pub fn polygon_bounds(polygon: &Polygon) -> Option<Bounds> {
    Bounds::from_points(polygon.exterior.iter())
}

pub fn polygon_is_finite(polygon: &Polygon) -> bool {
    polygon
        .exterior
        .iter()
        .chain(polygon.holes.iter().flatten())
        .all(|[x, y]| x.is_finite() && y.is_finite())
}

/// Canonical form of a CRS identifier: `EPSG:<code>` where one can be read,
/// otherwise the trimmed, upper-cased input. OGC CRS84 maps to EPSG:4326.
pub fn normalize_crs(crs: &str) -> String {
    let upper = crs.trim().to_ascii_uppercase();
    if upper.ends_with("CRS84") {
        return "EPSG:4326".to_string();
    }
    if upper.contains("EPSG") {
        let code: String = upper
            .chars()
            .rev()
            .take_while(|ch| ch.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if !code.is_empty() {
            return format!("EPSG:{}", code);
        }
    }
    upper
}

pub fn same_crs(a: &str, b: &str) -> bool {
    normalize_crs(a) == normalize_crs(b)
}

/// Longitude/latitude CRS, where projected coordinates are already degrees.
pub fn is_geographic_crs(crs: &str) -> bool {
    normalize_crs(crs) == "EPSG:4326"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Vec<[f64; 2]> {
        vec![[min, min], [min, max], [max, max], [max, min], [min, min]]
    }

    #[test]
    fn invert_round_trips_through_apply() {
        let t = AffineTransform::new(10.0, 0.5, 1000.0, -0.25, -10.0, 5000.0);
        let [x, y] = t.apply(3.0, 7.0);
        let (col, row) = t.invert(x, y).expect("invertible");
        assert!((col - 3.0).abs() < 1e-9);
        assert!((row - 7.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_transform_is_not_invertible() {
        let t = AffineTransform::new(1.0, 2.0, 0.0, 2.0, 4.0, 0.0);
        assert!(!t.is_invertible());
        assert!(t.invert(1.0, 1.0).is_none());
    }

    #[test]
    fn gdal_order_is_reshuffled() {
        let t = AffineTransform::from_gdal([100.0, 2.0, 0.0, 500.0, 0.0, -2.0]);
        assert_eq!(t, AffineTransform::north_up(100.0, 500.0, 2.0, 2.0));
    }

    #[test]
    fn north_up_extent_spans_the_grid() {
        let t = AffineTransform::north_up(0.0, 50.0, 10.0, 10.0);
        let extent = t.grid_extent(5, 4);
        assert_eq!(extent.to_array(), [0.0, 0.0, 40.0, 50.0]);
    }

    #[test]
    fn polygon_with_hole_excludes_hole_interior() {
        let polygon = Polygon {
            exterior: square(0.0, 10.0),
            holes: vec![square(4.0, 6.0)],
        };
        assert!(polygon_contains(&polygon, 1.0, 1.0));
        assert!(!polygon_contains(&polygon, 5.0, 5.0));
        assert!(!polygon_contains(&polygon, 11.0, 5.0));
    }

    #[test]
    fn crs_identifiers_are_normalized() {
        assert!(same_crs("EPSG:3413", "urn:ogc:def:crs:EPSG::3413"));
        assert!(same_crs("epsg:4326", "urn:ogc:def:crs:OGC:1.3:CRS84"));
        assert!(!same_crs("EPSG:3413", "EPSG:3996"));
        assert!(is_geographic_crs("EPSG:4326"));
        assert!(!is_geographic_crs("EPSG:3413"));
    }

    #[test]
    fn bounds_skip_non_finite_points() {
        let points = [[1.0, 2.0], [f64::NAN, 0.0], [3.0, -1.0]];
        let bounds = Bounds::from_points(points.iter()).expect("bounds");
        assert_eq!(bounds.to_array(), [1.0, -1.0, 3.0, 2.0]);
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }
}
