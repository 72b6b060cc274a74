//! `bn-crs`: coordinate transformations between reference systems.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`transform`] | `CoordinateTransformation` trait, proj and identity impls |
//! | [`registry`]  | Built-in proj definitions for common EPSG codes            |
//! | [`error`]     | `CrsError`, `CrsResult<T>`                                 |
//!
//! Projections are computed by the pure-Rust `proj4rs` crate, so no system
//! PROJ installation is needed.

pub mod error;
pub mod registry;
pub mod transform;


pub use error::{CrsError, CrsResult};
pub use registry::proj_definition;
pub use transform::{
    CoordinateTransformation, IdentityTransformation, ProjTransformation, transformation,
};
