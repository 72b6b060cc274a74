//! Transformation error type.

use thiserror::Error;

use bn_core::Coord;

/// Errors produced by `bn-crs`.
#[derive(Debug, Error)]
pub enum CrsError {
    #[error("no built-in definition for EPSG:{0}; pass a proj string instead")]
    UnknownEpsg(u32),

    #[error("proj error: {0}")]
    Proj(String),

    #[error("coordinate {0} is not finite")]
    NonFinite(Coord),
}

impl From<proj4rs::errors::Error> for CrsError {
    fn from(e: proj4rs::errors::Error) -> Self {
        CrsError::Proj(e.to_string())
    }
}

pub type CrsResult<T> = Result<T, CrsError>;
