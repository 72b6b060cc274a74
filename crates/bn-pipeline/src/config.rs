//! Pipeline configuration.

use std::path::PathBuf;

use bn_core::{Crs, ModeSet, TransportMode};

use crate::{PipelineError, PipelineResult};

/// Everything one run needs to know.
///
/// Typically filled in by the application binary; with the `serde` feature
/// it can also be loaded from a file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// OSM PBF input.
    pub osm_path: PathBuf,

    /// Single-band GeoTIFF elevation model.
    pub raster_path: PathBuf,

    /// Network output; gzip-compressed when it ends in `.gz`.
    pub output_path: PathBuf,

    /// System of the OSM coordinates.  Default: WGS84.
    pub source_crs: Crs,

    /// System the network is built and written in.
    pub network_crs: Crs,

    /// Overrides the system recorded in the raster file.
    pub raster_crs: Option<Crs>,

    /// Modes to build and clean the network for.  Default: bike and car.
    pub modes: ModeSet,

    /// Worker thread count for network construction.  `None` uses Rayon's
    /// global pool (all logical cores).
    pub num_threads: Option<usize>,
}

impl PipelineConfig {
    /// A configuration with the defaults above.
    pub fn new(
        osm_path: impl Into<PathBuf>,
        raster_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        network_crs: Crs,
    ) -> Self {
        Self {
            osm_path:    osm_path.into(),
            raster_path: raster_path.into(),
            output_path: output_path.into(),
            source_crs:  Crs::WGS84,
            network_crs,
            raster_crs:  None,
            modes:       ModeSet::of(&[TransportMode::Bike, TransportMode::Car]),
            num_threads: None,
        }
    }

    pub fn with_modes(mut self, modes: ModeSet) -> Self {
        self.modes = modes;
        self
    }

    pub fn with_raster_crs(mut self, crs: Crs) -> Self {
        self.raster_crs = Some(crs);
        self
    }

    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Check the configuration for obvious mistakes before any work starts.
    ///
    /// Input files must exist, the output directory must exist, the mode
    /// set must not be empty and a thread count must be positive.
    pub fn validate(&self) -> PipelineResult<()> {
        self.validate_settings()?;
        for (what, path) in [("OSM file", &self.osm_path), ("raster file", &self.raster_path)] {
            if !path.is_file() {
                return Err(PipelineError::Config(format!("{what} {} not found", path.display())));
            }
        }
        self.validate_output()
    }

    /// Mode set and thread count.
    pub(crate) fn validate_settings(&self) -> PipelineResult<()> {
        if self.modes.is_empty() {
            return Err(PipelineError::Config("mode set is empty".into()));
        }
        if self.num_threads == Some(0) {
            return Err(PipelineError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }

    /// The output checks of [`validate`](Self::validate) alone.
    pub(crate) fn validate_output(&self) -> PipelineResult<()> {
        if self.output_path.as_os_str().is_empty() {
            return Err(PipelineError::Config("output path is empty".into()));
        }
        match self.output_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => Err(PipelineError::Config(
                format!("output directory {} does not exist", dir.display()),
            )),
            _ => Ok(()),
        }
    }
}
