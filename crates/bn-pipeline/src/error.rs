use thiserror::Error;

use bn_crs::CrsError;
use bn_elevation::ElevationError;
use bn_network::NetworkError;
use bn_output::OutputError;
use bn_raster::RasterError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline configuration error: {0}")]
    Config(String),

    #[error("reference system error: {0}")]
    Crs(#[from] CrsError),

    #[error("raster error: {0}")]
    Raster(#[from] RasterError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("elevation error: {0}")]
    Elevation(#[from] ElevationError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
