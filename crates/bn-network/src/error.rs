//! Network-subsystem error type.

use thiserror::Error;

use bn_core::NodeId;
use bn_crs::CrsError;

/// Errors produced by `bn-network`.  All of them abort construction.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("cannot transform OSM node {osm_id}: {source}")]
    Transform {
        osm_id: i64,
        #[source]
        source: CrsError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
