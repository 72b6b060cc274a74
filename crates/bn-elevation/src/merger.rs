//! The elevation merge step.
//!
//! For one node:
//!
//! 1. read the position under the node's lock,
//! 2. bring a `Source` coordinate into the working system (`Working` ones
//!    pass through, `Unknown` ones are classified by magnitude),
//! 3. sample the elevation source,
//! 4. write back X/Y plus the sampled Z, or Z = [`FALLBACK_ELEVATION`] when
//!    anything in 2–3 failed.
//!
//! Every node is merged once; later requests return
//! [`MergeOutcome::AlreadyVisited`] without touching it.  A merger tracks
//! visits by `NodeId`, so use one merger per network build.

use std::sync::Arc;

use dashmap::DashSet;
use log::trace;

use bn_core::{Coord, CoordSpace, NodeId};
use bn_crs::CoordinateTransformation;
use bn_network::{LinkCreated, LinkObserver, NodeRef};
use bn_raster::{ElevationSource, RasterSampler, SampleFailure};

use crate::stats::Counters;
use crate::{ElevationError, ElevationResult, ElevationStats};

/// Z assigned when no valid sample can be obtained.
pub const FALLBACK_ELEVATION: f64 = 0.0;

/// Why a node received [`FALLBACK_ELEVATION`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FallbackReason {
    NoData,
    OutsideGrid,
    MissingGrid,
    InvalidCoordinate,
    /// The source → working transformation failed; X/Y stay untransformed.
    Transform,
}

impl From<SampleFailure> for FallbackReason {
    fn from(failure: SampleFailure) -> Self {
        match failure {
            SampleFailure::NoData            => FallbackReason::NoData,
            SampleFailure::OutsideGrid       => FallbackReason::OutsideGrid,
            SampleFailure::MissingGrid       => FallbackReason::MissingGrid,
            SampleFailure::InvalidCoordinate => FallbackReason::InvalidCoordinate,
        }
    }
}

/// Result of [`ElevationMerger::merge`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum MergeOutcome {
    Sampled(f64),
    Fallback(FallbackReason),
    AlreadyVisited,
}

impl MergeOutcome {
    /// The Z written by this call, if it wrote one.
    pub fn z(self) -> Option<f64> {
        match self {
            MergeOutcome::Sampled(z)     => Some(z),
            MergeOutcome::Fallback(_)    => Some(FALLBACK_ELEVATION),
            MergeOutcome::AlreadyVisited => None,
        }
    }
}

/// A coordinate brought into the working system with its elevation.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Resolved {
    /// X/Y in `space`, Z always set.
    pub coord:    Coord,
    pub space:    CoordSpace,
    pub fallback: Option<FallbackReason>,
}

impl Resolved {
    pub fn z(&self) -> f64 {
        self.coord.z.unwrap_or(FALLBACK_ELEVATION)
    }
}

/// Assigns elevations to network nodes.
///
/// `source` answers in the working system (typically a [`RasterSampler`]);
/// `to_working` converts `Source`-tagged coordinates into it.
pub struct ElevationMerger<S> {
    source:     S,
    to_working: Arc<dyn CoordinateTransformation>,
    visited:    DashSet<NodeId>,
    counters:   Counters,
}

impl ElevationMerger<RasterSampler> {
    /// A merger over `sampler`, checking that `to_working` lands in the
    /// sampler's working system.
    pub fn for_sampler(
        sampler: RasterSampler,
        to_working: Arc<dyn CoordinateTransformation>,
    ) -> ElevationResult<Self> {
        if to_working.target() != sampler.working_crs() {
            return Err(ElevationError::CrsMismatch {
                transformation: to_working.target().clone(),
                sampler:        sampler.working_crs().clone(),
            });
        }
        Ok(Self::new(sampler, to_working))
    }
}

impl<S: ElevationSource> ElevationMerger<S> {
    pub fn new(source: S, to_working: Arc<dyn CoordinateTransformation>) -> Self {
        Self {
            source,
            to_working,
            visited: DashSet::new(),
            counters: Counters::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Merge the elevation into `node`, unless it was merged before.
    ///
    /// The node's lock is held for the whole read-modify-write, so concurrent
    /// calls for the same node serialize and only the first one samples.
    pub fn merge(&self, node: NodeRef<'_>) -> MergeOutcome {
        let outcome = {
            let mut position = node.lock();
            if !self.visited.insert(node.id()) {
                MergeOutcome::AlreadyVisited
            } else {
                let resolved = self.resolve(position.coord, position.space);
                position.coord = resolved.coord;
                position.space = resolved.space;
                match resolved.fallback {
                    None         => MergeOutcome::Sampled(resolved.z()),
                    Some(reason) => MergeOutcome::Fallback(reason),
                }
            }
        };

        if let MergeOutcome::Fallback(reason) = outcome {
            trace!("node {} (osm {:?}): elevation fallback, {reason:?}", node.id(), node.osm_id());
        }
        self.counters.record(outcome);
        outcome
    }

    /// Steps 2–4 for a coordinate the caller owns.  Pure apart from the
    /// source lookup; nothing is recorded.
    pub fn resolve(&self, coord: Coord, space: CoordSpace) -> Resolved {
        let (xy, space) = match space.resolve(coord) {
            CoordSpace::Source => match self.to_working.try_transform(coord.xy()) {
                Ok(working) => (working, CoordSpace::Working),
                Err(e) => {
                    trace!("cannot transform {coord}: {e}");
                    return Resolved {
                        coord:    coord.with_z(FALLBACK_ELEVATION),
                        space:    CoordSpace::Source,
                        fallback: Some(FallbackReason::Transform),
                    };
                }
            },
            other => (coord.xy(), other),
        };

        let (z, fallback) = match self.source.elevation(xy) {
            Ok(z) if z.is_finite() => (z, None),
            Ok(_)                  => (FALLBACK_ELEVATION, Some(FallbackReason::NoData)),
            Err(failure)           => (FALLBACK_ELEVATION, Some(failure.into())),
        };
        Resolved { coord: xy.with_z(z), space, fallback }
    }

    /// Counters so far.
    pub fn stats(&self) -> ElevationStats {
        self.counters.snapshot()
    }

    /// Shorthand for `stats().fallbacks()`.
    pub fn fallbacks(&self) -> usize {
        self.stats().fallbacks()
    }

    /// `true` if `id` has been merged.
    pub fn is_visited(&self, id: NodeId) -> bool {
        self.visited.contains(&id)
    }
}

impl<S: ElevationSource> LinkObserver for ElevationMerger<S> {
    fn on_link_created(&self, event: &LinkCreated<'_>) {
        self.merge(event.from);
        self.merge(event.to);
    }
}

impl<S> std::fmt::Debug for ElevationMerger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevationMerger")
            .field("source_crs", self.to_working.source())
            .field("working_crs", self.to_working.target())
            .field("visited", &self.visited.len())
            .finish()
    }
}
