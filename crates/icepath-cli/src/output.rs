//! GeoJSON rendering of a planned route.

use icepath_core::RoutePlan;
use serde_json::{json, Value};

pub const ROUTE_NAME: &str = "route_with_weather";

/// FeatureCollection holding the route as one LineString in the frame's CRS.
pub fn route_feature_collection(plan: &RoutePlan) -> Value {
    let feature = json!({
        "type": "Feature",
        "properties": {
            "name": ROUTE_NAME,
            "weight": plan.path.weight,
            "cells": plan.path.cells.len(),
            "start": [plan.start.row, plan.start.col],
            "end": [plan.end.row, plan.end.col],
            "weather_penalty": plan.weather_penalty,
            "cold_penalty_cells": plan.cold_penalty_cells,
        },
        "geometry": {
            "type": "LineString",
            "coordinates": plan.coordinates,
        }
    });

    let mut collection = json!({
        "type": "FeatureCollection",
        "name": ROUTE_NAME,
        "features": [feature],
    });
    if let Some(crs) = &plan.crs {
        collection["crs"] = json!({"type": "name", "properties": {"name": crs}});
    }
    collection
}
