//! Chart and frame files on disk through to route GeoJSON.

use std::path::PathBuf;

use icepath_cli::{load_frame, load_terrain, route_feature_collection, VectorLoadOptions};
use icepath_core::{plan_route, EndpointPolicy, RouteConfig, RouteInputs, WeatherObservation};
use serde_json::json;

fn scratch(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("icepath-{}-{}", std::process::id(), name));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn files_to_route_geojson() {
    // Land block over cells (1..3, 1..3) of a 4x4 frame with unit pixels.
    let chart = json!({
        "type": "FeatureCollection",
        "crs": {"type": "name", "properties": {"name": "EPSG:32633"}},
        "features": [{
            "type": "Feature",
            "properties": {"ice_type": "Land"},
            "geometry": {"type": "Polygon", "coordinates": [[[1, 1], [1, 3], [3, 3], [3, 1], [1, 1]]]}
        }]
    });
    let frame = json!({
        "rows": 4,
        "cols": 4,
        "transform": [1.0, 0.0, 0.0, 0.0, -1.0, 4.0],
        "crs": "EPSG:32633",
        "no_data": [[3, 3]]
    });
    let chart_path = scratch("chart.geojson", &chart.to_string());
    let frame_path = scratch("frame.json", &frame.to_string());

    let terrain = load_terrain(&chart_path, &VectorLoadOptions::default()).unwrap();
    let descriptor = load_frame(&frame_path).unwrap();
    let spec = descriptor.grid_spec();
    let mask = descriptor.no_data_mask().unwrap();
    let observation = WeatherObservation {
        wind_speed_kmh: 0.0,
        visibility_m: None,
        temperature_c: None,
    };

    let plan = plan_route(
        &RouteInputs {
            terrain: &terrain.polygons,
            terrain_crs: terrain.crs.as_deref(),
            frame: &spec,
            no_data_mask: mask.as_ref(),
            observation: &observation,
            endpoints: EndpointPolicy::FirstLastOpenWater,
        },
        &RouteConfig::default(),
    )
    .unwrap();

    // (3, 3) is nodata, so the last open-water cell is (3, 2).
    assert_eq!((plan.end.row, plan.end.col), (3, 2));
    assert_eq!((plan.start.row, plan.start.col), (0, 0));
    for cell in &plan.path.cells {
        let land = (1..3).contains(&cell.row) && (1..3).contains(&cell.col);
        assert!(!land, "route crossed land at {}", cell);
    }

    let geojson = route_feature_collection(&plan);
    assert_eq!(geojson["crs"]["properties"]["name"], "EPSG:32633");
    assert_eq!(
        geojson["features"][0]["properties"]["cells"],
        plan.path.cells.len()
    );
    assert_eq!(geojson["features"][0]["geometry"]["coordinates"][0], json!([0.0, 4.0]));

    std::fs::remove_file(chart_path).ok();
    std::fs::remove_file(frame_path).ok();
}

#[test]
fn oversized_chart_file_is_refused() {
    let path = scratch(
        "big.geojson",
        &json!({"type": "FeatureCollection", "features": []}).to_string(),
    );
    let options = VectorLoadOptions {
        max_document_bytes: Some(4),
        ..VectorLoadOptions::default()
    };
    assert!(load_terrain(&path, &options).is_err());
    assert!(load_terrain(&path, &VectorLoadOptions::default()).is_ok());
    std::fs::remove_file(path).ok();
}
