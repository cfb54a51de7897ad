//! icepath CLI - file formats and helpers behind the command line tools.
//!
//! - `icepath-route`: plan a weather-aware route over an ice chart
//! - `icepath-bbox`: framing bounding box of a GeoJSON file

pub mod frame;
pub mod output;
pub mod terrain;

pub use frame::{load_frame, RasterDescriptor};
pub use output::route_feature_collection;
pub use terrain::{load_terrain, parse_terrain, TerrainLayer, VectorLoadOptions};

/// Installs the stderr log subscriber shared by the binaries.
pub fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("icepath=info".parse()?))
        .try_init()?;
    Ok(())
}
