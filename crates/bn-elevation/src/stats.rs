//! Merge counters.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{FallbackReason, MergeOutcome};

/// How the merges of one network build went.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElevationStats {
    /// Nodes that received a raster value.
    pub sampled:            usize,
    pub no_data:            usize,
    pub outside_grid:       usize,
    pub missing_grid:       usize,
    pub invalid_coordinate: usize,
    pub transform_failed:   usize,
    /// Merge requests for nodes that were already done.
    pub revisits:           usize,
}

impl ElevationStats {
    /// Nodes that fell back to the default elevation, for any reason.
    pub fn fallbacks(&self) -> usize {
        self.no_data
            + self.outside_grid
            + self.missing_grid
            + self.invalid_coordinate
            + self.transform_failed
    }

    /// Distinct nodes merged.
    pub fn merged(&self) -> usize {
        self.sampled + self.fallbacks()
    }
}

impl fmt::Display for ElevationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes merged, {} sampled, {} fallbacks \
             (no data {}, outside grid {}, missing grid {}, invalid {}, transform {})",
            self.merged(),
            self.sampled,
            self.fallbacks(),
            self.no_data,
            self.outside_grid,
            self.missing_grid,
            self.invalid_coordinate,
            self.transform_failed,
        )
    }
}

// ── Counters ──────────────────────────────────────────────────────────────────

/// Lock-free tallies behind [`ElevationStats`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    sampled:            AtomicUsize,
    no_data:            AtomicUsize,
    outside_grid:       AtomicUsize,
    missing_grid:       AtomicUsize,
    invalid_coordinate: AtomicUsize,
    transform_failed:   AtomicUsize,
    revisits:           AtomicUsize,
}

impl Counters {
    pub(crate) fn record(&self, outcome: MergeOutcome) {
        let counter = match outcome {
            MergeOutcome::Sampled(_)      => &self.sampled,
            MergeOutcome::AlreadyVisited  => &self.revisits,
            MergeOutcome::Fallback(reason) => match reason {
                FallbackReason::NoData            => &self.no_data,
                FallbackReason::OutsideGrid       => &self.outside_grid,
                FallbackReason::MissingGrid       => &self.missing_grid,
                FallbackReason::InvalidCoordinate => &self.invalid_coordinate,
                FallbackReason::Transform         => &self.transform_failed,
            },
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ElevationStats {
        let load = |c: &AtomicUsize| c.load(Ordering::Relaxed);
        ElevationStats {
            sampled:            load(&self.sampled),
            no_data:            load(&self.no_data),
            outside_grid:       load(&self.outside_grid),
            missing_grid:       load(&self.missing_grid),
            invalid_coordinate: load(&self.invalid_coordinate),
            transform_failed:   load(&self.transform_failed),
            revisits:           load(&self.revisits),
        }
    }
}
