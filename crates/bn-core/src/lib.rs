//! `bn-core`: foundational types for the `bikenet` workspace.
//!
//! This crate is a dependency of every other `bn-*` crate.  It intentionally
//! has no `bn-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `LinkId`                                    |
//! | [`geo`]         | `Coord`, `CoordSpace`, haversine distance             |
//! | [`crs`]         | `Crs` reference-system identifier                     |
//! | [`transport`]   | `TransportMode` enum, `ModeSet`                       |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod crs;
pub mod error;
pub mod geo;
pub mod ids;
pub mod transport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use crs::Crs;
pub use error::{CoreError, CoreResult};
pub use geo::{Coord, CoordSpace};
pub use ids::{LinkId, NodeId};
pub use transport::{ModeSet, TransportMode};
