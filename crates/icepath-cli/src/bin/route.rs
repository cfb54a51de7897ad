//! Plan a weather-aware least-cost route across an ice chart.
//!
//! Logs go to stderr; stdout carries only the route GeoJSON.

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use icepath_cli::{load_frame, load_terrain, route_feature_collection, VectorLoadOptions};
use icepath_core::{
    grid_center_lat_lon, plan_route, CostWeights, EndpointPolicy, GridIndex, PixelAnchor,
    RouteConfig, RouteInputs, WeatherQuery,
};
use icepath_weather::{WeatherClient, WeatherConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Anchor {
    Corner,
    Center,
}

impl From<Anchor> for PixelAnchor {
    fn from(anchor: Anchor) -> Self {
        match anchor {
            Anchor::Corner => PixelAnchor::Corner,
            Anchor::Center => PixelAnchor::Center,
        }
    }
}

/// Route across sea ice using chart classes and one hourly weather reading
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// GeoJSON FeatureCollection of ice-class polygons
    terrain: PathBuf,

    /// Raster frame descriptor (rows, cols, transform, crs, no_data)
    frame: PathBuf,

    /// Observation date (UTC)
    #[arg(long, default_value = "2025-11-18")]
    date: NaiveDate,

    /// Observation hour (UTC, 0-23)
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(0..24))]
    hour: u32,

    /// Weight on the ice cost surface
    #[arg(long, default_value_t = 10.0)]
    w_ice: f64,

    /// Weight on the weather penalty
    #[arg(long, default_value_t = 1.0)]
    w_weather: f64,

    /// Feature property holding the ice class
    #[arg(long, default_value = "ice_type")]
    label_property: String,

    /// Refuse terrain files larger than this many bytes
    #[arg(long)]
    max_vector_bytes: Option<u64>,

    /// Weather latitude; required unless the frame is in EPSG:4326
    #[arg(long, requires = "weather_lon", allow_negative_numbers = true)]
    weather_lat: Option<f64>,

    /// Weather longitude; required unless the frame is in EPSG:4326
    #[arg(long, requires = "weather_lat", allow_negative_numbers = true)]
    weather_lon: Option<f64>,

    /// Start cell as ROW,COL (default: first open-water cell)
    #[arg(long, value_parser = parse_cell, requires = "end")]
    start: Option<GridIndex>,

    /// End cell as ROW,COL (default: last open-water cell)
    #[arg(long, value_parser = parse_cell, requires = "start")]
    end: Option<GridIndex>,

    /// Which point of each cell the output line passes through
    #[arg(long, value_enum, default_value_t = Anchor::Corner)]
    anchor: Anchor,

    /// Give up after settling this many cells
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Write GeoJSON here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn parse_cell(raw: &str) -> Result<GridIndex, String> {
    let (row, col) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {:?}", raw))?;
    let row = row.trim().parse::<usize>().map_err(|e| e.to_string())?;
    let col = col.trim().parse::<usize>().map_err(|e| e.to_string())?;
    Ok(GridIndex::new(row, col))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    icepath_cli::init_tracing()?;
    let args = Args::parse();

    let options = VectorLoadOptions {
        class_property: args.label_property.clone(),
        max_document_bytes: args.max_vector_bytes,
    };
    let terrain = load_terrain(&args.terrain, &options)?;
    let descriptor = load_frame(&args.frame)?;
    let frame = descriptor.grid_spec();
    let no_data_mask = descriptor.no_data_mask()?;

    let (lat, lon) = match (args.weather_lat, args.weather_lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => match grid_center_lat_lon(&frame) {
            Some(point) => point,
            None => bail!("frame CRS is not geographic; pass --weather-lat and --weather-lon"),
        },
    };

    let client = WeatherClient::new(WeatherConfig::from_env())?;
    let observation = client
        .fetch_observation(&WeatherQuery {
            lat,
            lon,
            date: args.date,
            hour: args.hour,
        })
        .await?;

    let config = RouteConfig {
        weights: CostWeights {
            ice: args.w_ice,
            weather: args.w_weather,
        },
        max_expansions: args.max_expansions,
        anchor: args.anchor.into(),
        ..RouteConfig::default()
    };
    let endpoints = match (args.start, args.end) {
        (Some(start), Some(end)) => EndpointPolicy::Explicit { start, end },
        _ => EndpointPolicy::FirstLastOpenWater,
    };
    let inputs = RouteInputs {
        terrain: &terrain.polygons,
        terrain_crs: terrain.crs.as_deref(),
        frame: &frame,
        no_data_mask: no_data_mask.as_ref(),
        observation: &observation,
        endpoints,
    };

    let plan = plan_route(&inputs, &config)?;
    let geojson = serde_json::to_string_pretty(&route_feature_collection(&plan))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, geojson)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "Route written");
        }
        None => println!("{}", geojson),
    }
    Ok(())
}
