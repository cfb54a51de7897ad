//! Map-framing bounding box for a GeoJSON feature collection.
//!
//! Advisory only: every failure degrades to [`DEFAULT_BBOX`] instead of an error.

use serde_json::Value;

use crate::spatial::Bounds;

pub const DEFAULT_BBOX: [f64; 4] = [0.0, 0.0, 10.0, 10.0];

/// `[min_x, min_y, max_x, max_y]` for a GeoJSON document given as text.
pub fn bbox_from_str(text: &str) -> [f64; 4] {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => bbox_from_value(&value),
        Err(err) => {
            tracing::warn!("Unparseable GeoJSON, using default bbox: {}", err);
            DEFAULT_BBOX
        }
    }
}

/// Uses the collection's own `bbox` member when present, otherwise the extent
/// of every Polygon and MultiPolygon ring.
pub fn bbox_from_value(value: &Value) -> [f64; 4] {
    match collection_bbox(value) {
        Some(bbox) => bbox,
        None => {
            tracing::warn!("No usable coordinates found, using default bbox");
            DEFAULT_BBOX
        }
    }
}

fn collection_bbox(value: &Value) -> Option<[f64; 4]> {
    if let Some(bbox) = value.get("bbox") {
        return declared_bbox(bbox);
    }

    let mut points: Vec<[f64; 2]> = Vec::new();
    for feature in value.get("features")?.as_array()? {
        // Unlocated features (`"geometry": null`) add no coordinates.
        let Some(geometry) = feature.get("geometry").filter(|g| !g.is_null()) else {
            continue;
        };
        let coordinates = geometry.get("coordinates");
        match geometry.get("type").and_then(Value::as_str) {
            Some("Polygon") => collect_polygon(coordinates?, &mut points)?,
            Some("MultiPolygon") => {
                for polygon in coordinates?.as_array()? {
                    collect_polygon(polygon, &mut points)?;
                }
            }
            _ => {}
        }
    }

    Bounds::from_points(points.iter()).map(|bounds| bounds.to_array())
}

/// A declared bbox is `[minx, miny, maxx, maxy]` or the 3D
/// `[minx, miny, minz, maxx, maxy, maxz]`.
fn declared_bbox(bbox: &Value) -> Option<[f64; 4]> {
    let values: Vec<f64> = bbox
        .as_array()?
        .iter()
        .map(Value::as_f64)
        .collect::<Option<_>>()?;
    match values.as_slice() {
        [min_x, min_y, max_x, max_y] => Some([*min_x, *min_y, *max_x, *max_y]),
        [min_x, min_y, _, max_x, max_y, _] => Some([*min_x, *min_y, *max_x, *max_y]),
        _ => None,
    }
}

fn collect_polygon(polygon: &Value, points: &mut Vec<[f64; 2]>) -> Option<()> {
    for ring in polygon.as_array()? {
        for position in ring.as_array()? {
            let position = position.as_array()?;
            let x = position.first()?.as_f64()?;
            let y = position.get(1)?.as_f64()?;
            points.push([x, y]);
        }
    }
    Some(())
}
