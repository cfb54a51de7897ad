//! GeoJSON ice-chart loader.

use std::path::Path;

use anyhow::{bail, Context};
use icepath_core::{classify, Geometry, Polygon, RouteError, TerrainPolygon};
use serde_json::Value;

/// Explicit knobs for reading a vector chart.
#[derive(Debug, Clone)]
pub struct VectorLoadOptions {
    /// Feature property holding the ice class label
    pub class_property: String,
    /// Refuse documents larger than this; `None` reads any size
    pub max_document_bytes: Option<u64>,
}

impl Default for VectorLoadOptions {
    fn default() -> Self {
        Self {
            class_property: "ice_type".to_string(),
            max_document_bytes: None,
        }
    }
}

/// Classified polygons in document order plus the chart's declared CRS.
#[derive(Debug, Clone, Default)]
pub struct TerrainLayer {
    pub polygons: Vec<TerrainPolygon>,
    pub crs: Option<String>,
    /// Features dropped for having no polygonal geometry
    pub skipped: usize,
}

pub fn load_terrain(path: &Path, options: &VectorLoadOptions) -> anyhow::Result<TerrainLayer> {
    if let Some(limit) = options.max_document_bytes {
        let size = std::fs::metadata(path)
            .with_context(|| format!("reading {}", path.display()))?
            .len();
        if size > limit {
            bail!(
                "{} is {} bytes, above the {} byte vector limit",
                path.display(),
                size,
                limit
            );
        }
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_terrain(&text, options).with_context(|| format!("loading terrain from {}", path.display()))
}

pub fn parse_terrain(text: &str, options: &VectorLoadOptions) -> anyhow::Result<TerrainLayer> {
    if let Some(limit) = options.max_document_bytes {
        if text.len() as u64 > limit {
            bail!("vector document exceeds {} bytes", limit);
        }
    }

    let document: Value = serde_json::from_str(text).context("invalid GeoJSON")?;
    if document.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        bail!("expected a GeoJSON FeatureCollection");
    }
    let features = document
        .get("features")
        .and_then(Value::as_array)
        .context("FeatureCollection has no features array")?;

    let mut layer = TerrainLayer {
        crs: declared_crs(&document),
        ..TerrainLayer::default()
    };

    for (position, feature) in features.iter().enumerate() {
        let geometry = match feature.get("geometry").filter(|g| !g.is_null()) {
            Some(raw) => parse_geometry(raw)
                .with_context(|| format!("feature {}: bad geometry", position))?,
            None => None,
        };
        let Some(geometry) = geometry else {
            layer.skipped += 1;
            continue;
        };

        let label = feature
            .get("properties")
            .and_then(|props| props.get(&options.class_property))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RouteError::UnmappedClass(format!("<missing {}>", options.class_property))
            })
            .with_context(|| format!("feature {}", position))?;
        let class = classify(label).with_context(|| format!("feature {}", position))?;

        layer.polygons.push(TerrainPolygon { geometry, class });
    }

    if layer.skipped > 0 {
        tracing::warn!(skipped = layer.skipped, "Ignored features without polygon geometry");
    }
    tracing::info!(
        polygons = layer.polygons.len(),
        crs = ?layer.crs,
        "Terrain chart loaded"
    );
    Ok(layer)
}

/// Legacy `crs: {"type": "name", "properties": {"name": ...}}` member.
fn declared_crs(document: &Value) -> Option<String> {
    document
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
        .map(str::to_string)
}

/// `Ok(None)` for geometry types that cannot carry area.
fn parse_geometry(raw: &Value) -> anyhow::Result<Option<Geometry>> {
    let coordinates = raw.get("coordinates");
    match raw.get("type").and_then(Value::as_str) {
        Some("Polygon") => {
            let polygon = parse_polygon(coordinates.context("Polygon without coordinates")?)?;
            Ok(Some(Geometry::Polygon(polygon)))
        }
        Some("MultiPolygon") => {
            let parts = coordinates
                .and_then(Value::as_array)
                .context("MultiPolygon coordinates must be an array")?;
            let polygons = parts
                .iter()
                .map(parse_polygon)
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(Some(Geometry::MultiPolygon(polygons)))
        }
        _ => Ok(None),
    }
}

fn parse_polygon(value: &Value) -> anyhow::Result<Polygon> {
    let mut rings = value
        .as_array()
        .context("polygon must be an array of rings")?
        .iter()
        .map(parse_ring);
    let exterior = rings.next().context("polygon has no exterior ring")??;
    let holes = rings.collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Polygon { exterior, holes })
}

fn parse_ring(value: &Value) -> anyhow::Result<Vec<[f64; 2]>> {
    value
        .as_array()
        .context("ring must be an array of positions")?
        .iter()
        .map(|position| -> anyhow::Result<[f64; 2]> {
            let xy = position.as_array().context("position must be an array")?;
            match (
                xy.first().and_then(Value::as_f64),
                xy.get(1).and_then(Value::as_f64),
            ) {
                (Some(x), Some(y)) => Ok([x, y]),
                _ => bail!("position needs numeric x and y"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use icepath_core::TerrainClass;
    use serde_json::json;

    fn chart(features: Value) -> String {
        json!({
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3413"}},
            "features": features
        })
        .to_string()
    }

    #[test]
    fn reads_polygons_in_document_order() {
        let text = chart(json!([
            {
                "type": "Feature",
                "properties": {"ice_type": "thin ice"},
                "geometry": {"type": "Polygon", "coordinates": [
                    [[0, 0], [0, 4], [4, 4], [4, 0], [0, 0]],
                    [[1, 1], [2, 1], [2, 2], [1, 1]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {"ice_type": "Land", "name": "islet"},
                "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[5, 5, 0], [5, 6, 0], [6, 6, 0], [5, 5, 0]]]
                ]}
            }
        ]));
        let layer = parse_terrain(&text, &VectorLoadOptions::default()).unwrap();

        assert_eq!(layer.polygons.len(), 2);
        assert_eq!(layer.polygons[0].class, TerrainClass::ThinIce);
        assert_eq!(layer.polygons[1].class, TerrainClass::Land);
        assert_eq!(layer.polygons[0].geometry.polygons()[0].holes.len(), 1);
        assert_eq!(
            layer.polygons[1].geometry.polygons()[0].exterior[1],
            [5.0, 6.0]
        );
        assert_eq!(layer.crs.as_deref(), Some("urn:ogc:def:crs:EPSG::3413"));
    }

    #[test]
    fn custom_label_property() {
        let text = chart(json!([{
            "type": "Feature",
            "properties": {"class": "Medium Ice"},
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1], [0, 0]]]}
        }]));
        let options = VectorLoadOptions {
            class_property: "class".to_string(),
            ..VectorLoadOptions::default()
        };
        let layer = parse_terrain(&text, &options).unwrap();
        assert_eq!(layer.polygons[0].class, TerrainClass::MediumIce);
    }

    #[test]
    fn unknown_or_missing_label_is_unmapped() {
        for properties in [json!({"ice_type": "Slush"}), json!({})] {
            let text = chart(json!([{
                "type": "Feature",
                "properties": properties,
                "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1], [0, 0]]]}
            }]));
            let err = parse_terrain(&text, &VectorLoadOptions::default()).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<RouteError>(),
                Some(RouteError::UnmappedClass(_))
            ));
        }
    }

    #[test]
    fn non_polygon_features_are_skipped() {
        let text = chart(json!([
            {"type": "Feature", "properties": {"ice_type": "Water"}, "geometry": {"type": "Point", "coordinates": [1, 1]}},
            {"type": "Feature", "properties": {}, "geometry": null}
        ]));
        let layer = parse_terrain(&text, &VectorLoadOptions::default()).unwrap();
        assert!(layer.polygons.is_empty());
        assert_eq!(layer.skipped, 2);
    }

    #[test]
    fn rejects_oversized_or_malformed_documents() {
        let text = chart(json!([]));
        let tight = VectorLoadOptions {
            max_document_bytes: Some(8),
            ..VectorLoadOptions::default()
        };
        assert!(parse_terrain(&text, &tight).is_err());
        assert!(parse_terrain("{}", &VectorLoadOptions::default()).is_err());
        assert!(parse_terrain(
            &chart(json!([{
                "type": "Feature",
                "properties": {"ice_type": "Water"},
                "geometry": {"type": "Polygon", "coordinates": [[["x", 0]]]}
            }])),
            &VectorLoadOptions::default()
        )
        .is_err());
    }
}
