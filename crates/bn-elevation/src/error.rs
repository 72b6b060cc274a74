//! Merger construction errors.
//!
//! Merging itself never fails; see [`FallbackReason`](crate::FallbackReason).

use thiserror::Error;

use bn_core::Crs;

#[derive(Debug, Error)]
pub enum ElevationError {
    /// The transformation produces coordinates in a different system than the
    /// sampler expects.
    #[error("transformation targets {transformation} but the sampler expects {sampler}")]
    CrsMismatch { transformation: Crs, sampler: Crs },
}

pub type ElevationResult<T> = Result<T, ElevationError>;
