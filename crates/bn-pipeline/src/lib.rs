//! `bn-pipeline`: OSM network plus DEM elevation, end to end.
//!
//! # Stages
//!
//! ```text
//! ① Open     : load the GeoTIFF into a RasterSampler (working CRS).
//! ② Read     : parse the OSM PBF into an OsmExtract.
//! ③ Build    : OsmNetworkReader projects nodes into the working CRS and
//!               creates links in parallel; the ElevationMerger observer
//!               assigns a Z to both endpoints of every new link.
//! ④ Clean    : keep each mode's largest strongly connected component.
//! ⑤ Write    : MATSim network XML, gzip-compressed for `.gz` paths.
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                         |
//! |--------------|--------------------------------------------------|
//! | [`config`]   | `PipelineConfig`                                 |
//! | [`pipeline`] | `Pipeline`, `PipelineReport`                     |
//! | [`error`]    | `PipelineError`, `PipelineResult<T>`             |
//!
//! # Cargo features
//!
//! | Feature | Effect                                                    |
//! |---------|-----------------------------------------------------------|
//! | `osm`   | `Pipeline::run` reads OSM PBF files (on by default).      |
//! | `serde` | Serialize/deserialize configuration and report.           |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use bn_core::Crs;
//! use bn_pipeline::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::new(
//!     "allroads_brussels.osm.pbf",
//!     "SMALL_2_4.tif",
//!     "elevation_merged.xml.gz",
//!     Crs::BELGIAN_LAMBERT_72,
//! );
//! let report = Pipeline::new(config)?.run()?;
//! ```

pub mod config;
pub mod error;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{Pipeline, PipelineReport};
