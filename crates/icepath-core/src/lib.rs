pub mod bounds;
pub mod classify;
pub mod combine;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod projector;
pub mod raster;
pub mod route_engine;
pub mod rules;
pub mod spatial;
pub mod weather;

pub use bounds::{bbox_from_str, bbox_from_value, DEFAULT_BBOX};
pub use classify::classify;
pub use combine::combine;
pub use error::{Result, RouteError};
pub use models::{
    CellCost, CostGrid, Geometry, Grid, GridIndex, GridSpec, PathResult, Polygon, TerrainClass,
    TerrainPolygon, WeatherObservation, WeatherQuery,
};
pub use pipeline::{
    grid_center_lat_lon, plan_route, select_endpoints, EndpointPolicy, RouteInputs, RoutePlan,
};
pub use projector::project_path;
pub use raster::build_cost_grid;
pub use route_engine::{find_path, find_path_bounded};
pub use rules::{CostWeights, PixelAnchor, RouteConfig, WeatherPenaltyConfig};
pub use spatial::{AffineTransform, Bounds};
pub use weather::{cell_penalty, scalar_penalty};
