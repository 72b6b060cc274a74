//! Core error type.
//!
//! Sub-crates define their own error enums; `CoreError` only covers parsing
//! of the identifiers defined here.

use thiserror::Error;

/// Errors produced while parsing `bn-core` values from text.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid reference system {0:?}")]
    InvalidCrs(String),

    #[error("unknown transport mode {0:?}")]
    UnknownMode(String),
}

/// Shorthand result type for `bn-core`.
pub type CoreResult<T> = Result<T, CoreError>;
