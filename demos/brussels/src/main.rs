//! brussels: bicycle network of Brussels with elevations.
//!
//! Reads the OSM road network of the Brussels region, projects it to
//! Belgian Lambert 72 (EPSG:31370), samples every node's elevation from a
//! digital elevation model and writes a gzip-compressed MATSim network.
//!
//! ```text
//! cargo run --release -p brussels [OSM_PBF [DEM_TIFF [OUTPUT]]]
//! ```
//!
//! Set `RUST_LOG=info` (or `debug`) for progress output.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use bn_core::{Crs, ModeSet, TransportMode};
use bn_pipeline::{Pipeline, PipelineConfig};

// ── Constants ─────────────────────────────────────────────────────────────────

const OSM_FILE:    &str = "allroads_brussels.osm.pbf";
const DEM_FILE:    &str = "SMALL_2_4.tif";
const OUTPUT_FILE: &str = "elevation_merged.xml.gz";
const NETWORK_CRS: Crs  = Crs::BELGIAN_LAMBERT_72;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let osm = args.next().unwrap_or_else(|| OSM_FILE.into());
    let dem = args.next().unwrap_or_else(|| DEM_FILE.into());
    let out = args.next().unwrap_or_else(|| OUTPUT_FILE.into());

    let config = PipelineConfig::new(osm, dem, out, NETWORK_CRS)
        .with_modes(ModeSet::of(&[TransportMode::Car, TransportMode::Bike]));

    let started = Instant::now();
    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    let report = pipeline.run().context("pipeline failed")?;

    info!("done in {:.1?}", started.elapsed());
    println!("{report}");
    println!("wrote {}", pipeline.config().output_path.display());
    Ok(())
}
