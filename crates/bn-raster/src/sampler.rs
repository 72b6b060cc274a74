//! Point sampling contract and the working-system sampler.

use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};

use bn_core::{Coord, Crs};
use bn_crs::{transformation, CoordinateTransformation};

use crate::{read_geotiff, ElevationRaster, RasterError, RasterResult};

// ── Sample outcome ────────────────────────────────────────────────────────────

/// Why a sample could not be produced.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum SampleFailure {
    /// The coordinate resolves to a cell index outside the grid.
    OutsideGrid,
    /// The cell lies in a part of the grid that was never loaded.
    MissingGrid,
    /// The cell holds the no-data sentinel (or NaN).
    NoData,
    /// The coordinate itself is not finite, e.g. a failed projection.
    InvalidCoordinate,
}

impl SampleFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            SampleFailure::OutsideGrid       => "outside grid",
            SampleFailure::MissingGrid       => "missing grid",
            SampleFailure::NoData            => "no data",
            SampleFailure::InvalidCoordinate => "invalid coordinate",
        }
    }
}

impl std::fmt::Display for SampleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finite elevation in metres, or the reason there is none.
pub type ElevationSample = Result<f64, SampleFailure>;

// ── ElevationSource ───────────────────────────────────────────────────────────

/// Anything that can answer "what is the elevation here?".
///
/// Implementations never substitute a default value for a failure.
///
/// # Thread safety
///
/// `Send + Sync` so a single source can serve every construction worker.
pub trait ElevationSource: Send + Sync {
    fn elevation(&self, coord: Coord) -> ElevationSample;
}

impl<S: ElevationSource + ?Sized> ElevationSource for &S {
    fn elevation(&self, coord: Coord) -> ElevationSample {
        (**self).elevation(coord)
    }
}

impl<S: ElevationSource + ?Sized> ElevationSource for Arc<S> {
    fn elevation(&self, coord: Coord) -> ElevationSample {
        (**self).elevation(coord)
    }
}

// ── RasterSampler ─────────────────────────────────────────────────────────────

/// An [`ElevationRaster`] queried with coordinates in a network's working
/// reference system.
///
/// Opened once and shared read-only; dropping it releases the grid.
pub struct RasterSampler {
    raster:    ElevationRaster,
    working:   Crs,
    /// `None` when the raster already uses the working system.
    to_raster: Option<Box<dyn CoordinateTransformation>>,
}

impl RasterSampler {
    /// Open the GeoTIFF at `path` for sampling with `working` coordinates.
    ///
    /// `raster_crs` overrides the reference system recorded in the file.
    ///
    /// # Errors
    ///
    /// Any [`RasterError`] from reading the file, [`RasterError::UnknownCrs`]
    /// when neither the file nor `raster_crs` names the raster's system, and
    /// [`RasterError::Crs`] when no transformation to it exists.
    pub fn open(path: &Path, working: Crs, raster_crs: Option<Crs>) -> RasterResult<Self> {
        let mut raster = read_geotiff(path)?;
        if let Some(crs) = raster_crs {
            if let Some(recorded) = raster.crs().filter(|r| **r != crs) {
                warn!("{}: overriding recorded {recorded} with configured {crs}", path.display());
            }
            raster = raster.with_crs(crs);
        }
        if raster.crs().is_none() {
            return Err(RasterError::UnknownCrs(path.to_path_buf()));
        }
        Self::new(raster, working)
    }

    /// Wrap an already-loaded raster.  A raster without a recorded
    /// reference system is assumed to share `working`.
    pub fn new(raster: ElevationRaster, working: Crs) -> RasterResult<Self> {
        let to_raster = match raster.crs() {
            Some(raster_crs) if *raster_crs != working => {
                debug!("sampling {raster_crs} raster with {working} coordinates");
                Some(transformation(&working, raster_crs)?)
            }
            _ => None,
        };
        Ok(Self { raster, working, to_raster })
    }

    pub fn raster(&self) -> &ElevationRaster {
        &self.raster
    }

    pub fn working_crs(&self) -> &Crs {
        &self.working
    }

    /// Elevation at `coord` (working reference system).
    pub fn get_elevation(&self, coord: Coord) -> ElevationSample {
        match &self.to_raster {
            Some(t) => self.raster.sample(t.transform(coord)),
            None    => self.raster.sample(coord),
        }
    }
}

impl ElevationSource for RasterSampler {
    fn elevation(&self, coord: Coord) -> ElevationSample {
        self.get_elevation(coord)
    }
}

impl std::fmt::Debug for RasterSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSampler")
            .field("working", &self.working)
            .field("raster_crs", &self.raster.crs())
            .field("extent", &self.raster.extent())
            .finish()
    }
}
