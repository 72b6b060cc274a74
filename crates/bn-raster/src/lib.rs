//! `bn-raster`: elevation rasters and point sampling.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`grid`]     | `GeoTransform`, `ChunkedGrid`, `ElevationRaster`          |
//! | [`geotiff`]  | `read_geotiff`: GeoTIFF → `ElevationRaster`              |
//! | [`sampler`]  | `ElevationSource` trait, `SampleFailure`, `RasterSampler` |
//! | [`error`]    | `RasterError`, `RasterResult<T>`                          |
//!
//! # Failure signalling
//!
//! Sampling never returns a made-up value.  Every lookup yields an
//! [`ElevationSample`]: either the cell value or a [`SampleFailure`] saying
//! *why* there is none.  Picking a fallback is the caller's business.

pub mod error;
pub mod geotiff;
pub mod grid;
pub mod sampler;

#[cfg(test)]
mod tests;

pub use error::{RasterError, RasterResult};
pub use geotiff::read_geotiff;
pub use grid::{ChunkedGrid, ElevationRaster, GeoTransform};
pub use sampler::{ElevationSample, ElevationSource, RasterSampler, SampleFailure};
