//! `bn-network`: road network graph, construction from OSM, and cleaning.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`network`]  | `Network`, `Node`, `Link`, `Adjacency`, `NetworkBuilder`    |
//! | [`observer`] | `LinkObserver` trait, `LinkCreated` event, `NoopObserver`   |
//! | [`reader`]   | `OsmExtract`, `OsmNetworkReader` (extract → network)        |
//! | [`highway`]  | `highway=*` defaults and bicycle access rules               |
//! | [`cleaner`]  | `clean`: keep the largest strongly connected part per mode |
//! | [`osm`]      | PBF parsing (feature = `"osm"` only)                        |
//! | [`error`]    | `NetworkError`, `NetworkResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `osm`      | Enables OSM PBF loading via the `osmpbf` crate.           |
//! | `parallel` | Link materialization on Rayon (default).                  |
//! | `serde`    | Derives `Serialize`/`Deserialize` on public types.        |

pub mod cleaner;
pub mod error;
pub mod highway;
pub mod network;
pub mod observer;
pub mod reader;

#[cfg(feature = "osm")]
pub mod osm;


pub use cleaner::{clean, CleanReport};
pub use error::{NetworkError, NetworkResult};
pub use network::{Adjacency, Direction, Link, Network, NetworkBuilder, Node, NodeRef, Position};
pub use observer::{from_fn, FnObserver, LinkCreated, LinkObserver, NoopObserver};
pub use reader::{OsmExtract, OsmNetworkReader, OsmNetworkReaderBuilder, OsmWay};
