//! Print the framing bounding box of a GeoJSON file.
//!
//! Always succeeds: unreadable or empty input prints the default box.

use std::path::PathBuf;

use clap::Parser;
use icepath_core::{bbox_from_str, DEFAULT_BBOX};
use serde_json::json;

/// Print {"bbox": [min_x, min_y, max_x, max_y]} for a GeoJSON FeatureCollection
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// GeoJSON file to frame
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let _ = icepath_cli::init_tracing();
    let args = Args::parse();

    let bbox = match std::fs::read_to_string(&args.path) {
        Ok(text) => bbox_from_str(&text),
        Err(err) => {
            tracing::warn!(path = %args.path.display(), "Cannot read file, using default bbox: {}", err);
            DEFAULT_BBOX
        }
    };

    println!("{}", json!({ "bbox": bbox }));
    Ok(())
}
