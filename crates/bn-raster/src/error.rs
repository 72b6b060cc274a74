//! Raster error type.
//!
//! These are load-time errors.  Per-point sampling problems are not errors;
//! see [`SampleFailure`](crate::SampleFailure).

use std::path::PathBuf;

use thiserror::Error;

use bn_crs::CrsError;

/// Errors produced while opening a raster.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("{0} carries no georeferencing tags")]
    MissingGeoreference(PathBuf),

    #[error("unsupported georeferencing: {0}")]
    UnsupportedGeoreference(String),

    #[error("unsupported raster layout: {0}")]
    UnsupportedLayout(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("reference system of {0} is unknown; configure it explicitly")]
    UnknownCrs(PathBuf),

    #[error("grid expects {expected} cells, got {got}")]
    GridSize { expected: usize, got: usize },

    #[error("reference system error: {0}")]
    Crs(#[from] CrsError),
}

pub type RasterResult<T> = Result<T, RasterError>;
