//! `bn-elevation`: raster elevations for network nodes.
//!
//! An [`ElevationMerger`] is plugged into network construction as a
//! [`LinkObserver`](bn_network::LinkObserver): every time a link appears,
//! both endpoint nodes get a Z coordinate, sampled from the raster or set to
//! [`FALLBACK_ELEVATION`] when sampling is impossible.  Failures never
//! propagate; they are counted in [`ElevationStats`].
//!
//! # Crate layout
//!
//! | Module     | Contents                                                 |
//! |------------|----------------------------------------------------------|
//! | [`merger`] | `ElevationMerger`, `MergeOutcome`, `FallbackReason`      |
//! | [`stats`]  | `ElevationStats`                                         |
//! | [`error`]  | `ElevationError`, `ElevationResult<T>`                   |
//!
//! # Usage
//!
//! ```rust,ignore
//! let sampler = RasterSampler::open(dem, Crs::BELGIAN_LAMBERT_72, None)?;
//! let to_working: Arc<dyn CoordinateTransformation> =
//!     Arc::from(transformation(&Crs::WGS84, &Crs::BELGIAN_LAMBERT_72)?);
//! let merger = ElevationMerger::for_sampler(sampler, to_working.clone())?;
//!
//! let network = OsmNetworkReader::builder()
//!     .transformation(to_working)
//!     .after_link_created(&merger)
//!     .build()
//!     .read(pbf)?;
//! log::info!("{}", merger.stats());
//! ```

pub mod error;
pub mod merger;
pub mod stats;


pub use error::{ElevationError, ElevationResult};
pub use merger::{ElevationMerger, FallbackReason, MergeOutcome, Resolved, FALLBACK_ELEVATION};
pub use stats::ElevationStats;
