//! The `Pipeline` runner.

use std::fmt;
use std::sync::Arc;

use log::{debug, info};

use bn_crs::{transformation, CoordinateTransformation};
use bn_elevation::{ElevationMerger, ElevationStats};
use bn_network::{clean, CleanReport, Network, OsmExtract, OsmNetworkReader};
use bn_output::write_network;
use bn_raster::RasterSampler;

use crate::{PipelineConfig, PipelineResult};

/// What a run produced.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineReport {
    /// Nodes in the written network.
    pub nodes:     usize,
    /// Links in the written network.
    pub links:     usize,
    pub clean:     CleanReport,
    pub elevation: ElevationStats,
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} links ({} nodes / {} links removed by cleaning); elevation: {}",
            self.nodes, self.links, self.clean.nodes_removed, self.clean.links_removed, self.elevation
        )
    }
}

/// Reads the OSM network, merges raster elevations into it while it is
/// built, cleans it for the configured modes and writes it.
///
/// # Example
///
/// ```rust,ignore
/// let config = PipelineConfig::new("city.osm.pbf", "dem.tif", "network.xml.gz", Crs::BELGIAN_LAMBERT_72);
/// let report = Pipeline::new(config)?.run()?;
/// println!("{report}");
/// ```
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate `config` and wrap it.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Wrap `config` without checking the input files; for callers that
    /// supply the inputs in memory through [`process`](Self::process).
    pub fn for_process(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate_settings()?;
        config.validate_output()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run end to end from the configured files.
    ///
    /// The raster is opened here and released when this returns.
    #[cfg(feature = "osm")]
    pub fn run(&self) -> PipelineResult<PipelineReport> {
        let c = &self.config;
        let sampler = RasterSampler::open(&c.raster_path, c.network_crs.clone(), c.raster_crs.clone())?;
        debug!("opened raster {}: {sampler:?}", c.raster_path.display());

        let extract = OsmExtract::from_pbf(&c.osm_path)?;
        self.process(&extract, sampler)
    }

    /// [`build`](Self::build) then write to the configured output path.
    pub fn process(&self, extract: &OsmExtract, sampler: RasterSampler) -> PipelineResult<PipelineReport> {
        let (network, report) = self.build(extract, sampler)?;
        write_network(&network, &self.config.output_path)?;
        info!("wrote {}: {report}", self.config.output_path.display());
        Ok(report)
    }

    /// Construct, merge elevations and clean, without writing.
    pub fn build(&self, extract: &OsmExtract, sampler: RasterSampler) -> PipelineResult<(Network, PipelineReport)> {
        match self.config.num_threads {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
                pool.install(|| self.build_on_current_pool(extract, sampler))
            }
            None => self.build_on_current_pool(extract, sampler),
        }
    }

    fn build_on_current_pool(
        &self,
        extract: &OsmExtract,
        sampler: RasterSampler,
    ) -> PipelineResult<(Network, PipelineReport)> {
        let c = &self.config;
        let to_working: Arc<dyn CoordinateTransformation> =
            Arc::from(transformation(&c.source_crs, &c.network_crs)?);
        let merger = ElevationMerger::for_sampler(sampler, Arc::clone(&to_working))?;

        let mut network = OsmNetworkReader::builder()
            .transformation(to_working)
            .after_link_created(&merger)
            .modes(c.modes)
            .build()
            .read_extract(extract)?;
        let elevation = merger.stats();
        info!("elevation: {elevation}");
        drop(merger);

        let clean = clean(&mut network, &c.modes);
        let report = PipelineReport {
            nodes: network.node_count(),
            links: network.link_count(),
            clean,
            elevation,
        };
        Ok((network, report))
    }
}
