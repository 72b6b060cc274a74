//! The `CoordinateTransformation` trait and its implementations.
//!
//! # Units
//!
//! Geographic systems are exchanged in **degrees** (`x` = longitude,
//! `y` = latitude) at this API boundary.  `proj4rs` works in radians for
//! lat/long systems; the conversion happens inside [`ProjTransformation`].
//! Z is never touched.

use log::debug;
use proj4rs::proj::Proj;

use bn_core::{Coord, Crs};

use crate::{proj_definition, CrsError, CrsResult};

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Converts coordinates from a fixed source system to a fixed target system.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: network construction calls them
/// from every Rayon worker.
pub trait CoordinateTransformation: Send + Sync {
    fn source(&self) -> &Crs;

    fn target(&self) -> &Crs;

    /// Transform `coord`, reporting projection failures.
    fn try_transform(&self, coord: Coord) -> CrsResult<Coord>;

    /// Transform `coord`; never fails.  A projection failure yields a
    /// non-finite coordinate, which every consumer in this workspace treats
    /// as "unavailable".
    fn transform(&self, coord: Coord) -> Coord {
        self.try_transform(coord).unwrap_or(Coord {
            x: f64::NAN,
            y: f64::NAN,
            z: coord.z,
        })
    }
}

/// Build the transformation from `source` to `target`.
///
/// Returns an [`IdentityTransformation`] when both systems are equal, so
/// callers never pay for a no-op projection.
pub fn transformation(
    source: &Crs,
    target: &Crs,
) -> CrsResult<Box<dyn CoordinateTransformation>> {
    if source == target {
        return Ok(Box::new(IdentityTransformation::new(source.clone())));
    }
    Ok(Box::new(ProjTransformation::new(source, target)?))
}

// ── IdentityTransformation ────────────────────────────────────────────────────

/// Passes coordinates through unchanged.
#[derive(Clone, Debug)]
pub struct IdentityTransformation {
    crs: Crs,
}

impl IdentityTransformation {
    pub fn new(crs: Crs) -> Self {
        Self { crs }
    }
}

impl CoordinateTransformation for IdentityTransformation {
    fn source(&self) -> &Crs {
        &self.crs
    }

    fn target(&self) -> &Crs {
        &self.crs
    }

    fn try_transform(&self, coord: Coord) -> CrsResult<Coord> {
        if !coord.is_finite() {
            return Err(CrsError::NonFinite(coord));
        }
        Ok(coord)
    }
}

// ── ProjTransformation ────────────────────────────────────────────────────────

/// A transformation computed by `proj4rs`.
pub struct ProjTransformation {
    source:     Crs,
    target:     Crs,
    src:        Proj,
    dst:        Proj,
}

impl ProjTransformation {
    /// Resolve both systems to proj definitions and initialise them.
    ///
    /// # Errors
    ///
    /// [`CrsError::UnknownEpsg`] for EPSG codes without a built-in
    /// definition, [`CrsError::Proj`] for definitions proj4rs rejects.
    pub fn new(source: &Crs, target: &Crs) -> CrsResult<Self> {
        let src = Proj::from_proj_string(proj_definition(source)?)?;
        let dst = Proj::from_proj_string(proj_definition(target)?)?;
        debug!("initialised transformation {source} -> {target}");
        Ok(Self {
            source: source.clone(),
            target: target.clone(),
            src,
            dst,
        })
    }
}

impl CoordinateTransformation for ProjTransformation {
    fn source(&self) -> &Crs {
        &self.source
    }

    fn target(&self) -> &Crs {
        &self.target
    }

    fn try_transform(&self, coord: Coord) -> CrsResult<Coord> {
        if !coord.is_finite() {
            return Err(CrsError::NonFinite(coord));
        }

        let mut point = if self.src.is_latlong() {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };

        proj4rs::transform::transform(&self.src, &self.dst, &mut point)?;

        let (x, y) = if self.dst.is_latlong() {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        let out = Coord { x, y, z: coord.z };
        if !out.is_finite() {
            return Err(CrsError::NonFinite(out));
        }
        Ok(out)
    }
}

impl std::fmt::Debug for ProjTransformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjTransformation")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish()
    }
}
