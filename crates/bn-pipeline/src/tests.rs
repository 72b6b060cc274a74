//! Integration tests for bn-pipeline.

#[cfg(test)]
mod helpers {
    use bn_core::Crs;
    use bn_network::{OsmExtract, OsmWay};
    use bn_raster::{ChunkedGrid, ElevationRaster, GeoTransform, RasterSampler};

    pub const NODATA: f32 = -9_999.0;

    /// 4×3 cells of 10 m, top-left corner at (150 000, 170 030) in Lambert 72.
    /// Cell (1, 1) holds 42.5, cell (2, 1) is no-data.
    pub fn sampler() -> RasterSampler {
        let cells = vec![
            10.0, 11.0, 12.0,   13.0,
            20.0, 42.5, NODATA, 23.0,
            30.0, 31.0, 32.0,   33.0,
        ];
        let grid = ChunkedGrid::from_cells(4, 3, cells).unwrap();
        let raster = ElevationRaster::new(grid, GeoTransform::new(150_000.0, 170_030.0, 10.0, 10.0))
            .with_nodata(NODATA)
            .with_crs(Crs::BELGIAN_LAMBERT_72);
        RasterSampler::new(raster, Crs::BELGIAN_LAMBERT_72).unwrap()
    }

    /// Coordinates already in Lambert 72.
    ///
    /// ```text
    ///   1 (inside) ── 2 (no-data) ── 3 (outside)      residential, both ways
    ///
    ///   4 ── 5                                        cycleway, far east
    /// ```
    pub fn extract() -> OsmExtract {
        let mut e = OsmExtract::new();
        e.add_node(1, 150_015.0, 170_015.0);
        e.add_node(2, 150_025.0, 170_015.0);
        e.add_node(3, 151_000.0, 170_015.0);
        e.add_node(4, 152_000.0, 170_015.0);
        e.add_node(5, 152_010.0, 170_015.0);
        e.add_way(OsmWay::new(10, vec![1, 2, 3]).with_tag("highway", "residential"));
        e.add_way(OsmWay::new(11, vec![4, 5]).with_tag("highway", "cycleway"));
        e
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::fs;

    use bn_core::{Crs, ModeSet};
    use tempfile::TempDir;

    use crate::{Pipeline, PipelineConfig, PipelineError};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn with_inputs(dir: &TempDir) -> PipelineConfig {
        let osm = dir.path().join("city.osm.pbf");
        let dem = dir.path().join("dem.tif");
        fs::write(&osm, b"not a pbf").unwrap();
        fs::write(&dem, b"not a tiff").unwrap();
        PipelineConfig::new(osm, dem, dir.path().join("out.xml.gz"), Crs::BELGIAN_LAMBERT_72)
    }

    #[test]
    fn defaults() {
        let c = PipelineConfig::new("a.pbf", "b.tif", "c.xml", Crs::BELGIAN_LAMBERT_72);
        assert_eq!(c.source_crs, Crs::WGS84);
        assert_eq!(c.modes.to_string(), "bike,car");
        assert_eq!(c.raster_crs, None);
        assert_eq!(c.num_threads, None);
    }

    #[test]
    fn valid_inputs_accepted() {
        let dir = tmp();
        assert!(with_inputs(&dir).validate().is_ok());
    }

    #[test]
    fn missing_input_rejected() {
        let dir = tmp();
        let mut c = with_inputs(&dir);
        c.raster_path = dir.path().join("absent.tif");
        assert!(matches!(Pipeline::new(c), Err(PipelineError::Config(_))));
    }

    #[test]
    fn missing_output_directory_rejected() {
        let dir = tmp();
        let mut c = with_inputs(&dir);
        c.output_path = dir.path().join("absent").join("out.xml.gz");
        assert!(matches!(c.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn empty_modes_rejected() {
        let dir = tmp();
        let c = with_inputs(&dir).with_modes(ModeSet::default());
        assert!(matches!(c.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn zero_threads_rejected() {
        let dir = tmp();
        let c = with_inputs(&dir).with_num_threads(0);
        assert!(matches!(c.validate(), Err(PipelineError::Config(_))));
    }

    #[cfg(feature = "osm")]
    #[test]
    fn unreadable_raster_fails_the_run() {
        let dir = tmp();
        let pipeline = Pipeline::new(with_inputs(&dir)).unwrap();
        assert!(matches!(pipeline.run(), Err(PipelineError::Raster(_))));
        assert!(!dir.path().join("out.xml.gz").exists());
    }
}

// ── End to end ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod end_to_end {
    use std::io::Read;

    use bn_core::{Crs, ModeSet, TransportMode};
    use bn_network::CleanReport;
    use flate2::read::GzDecoder;
    use tempfile::TempDir;

    use super::helpers::{extract, sampler};
    use crate::{Pipeline, PipelineConfig, PipelineError};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    /// Source and network systems are both Lambert 72, so the extract's
    /// coordinates pass through unchanged.
    fn pipeline(dir: &TempDir) -> Pipeline {
        let mut c = PipelineConfig::new(
            "unused.osm.pbf",
            "unused.tif",
            dir.path().join("network.xml.gz"),
            Crs::BELGIAN_LAMBERT_72,
        );
        c.source_crs = Crs::BELGIAN_LAMBERT_72;
        Pipeline::for_process(c).unwrap()
    }

    #[test]
    fn elevations_and_fallbacks() {
        let dir = tmp();
        let (net, report) = pipeline(&dir).build(&extract(), sampler()).unwrap();

        let z = |osm: i64| net.nodes.iter().find(|n| n.osm_id == Some(osm)).and_then(|n| n.coord.z);
        assert_eq!(z(1), Some(42.5));
        assert_eq!(z(2), Some(0.0));
        assert_eq!(z(3), Some(0.0));

        assert_eq!(report.elevation.sampled, 1);
        assert_eq!(report.elevation.no_data, 1);
        assert_eq!(report.elevation.outside_grid, 3);
        assert_eq!(report.elevation.merged(), 5);
    }

    #[test]
    fn isolated_cycleway_is_cleaned() {
        let dir = tmp();
        let (net, report) = pipeline(&dir).build(&extract(), sampler()).unwrap();

        assert_eq!(report.clean, CleanReport { nodes_removed: 2, links_removed: 2, modes_stripped: 2 });
        assert_eq!((report.nodes, report.links), (3, 4));
        assert_eq!((net.node_count(), net.link_count()), (3, 4));
        assert!(net.links.iter().all(|l| l.osm_way == Some(10)));
    }

    #[test]
    fn process_writes_gzip_xml() {
        let dir = tmp();
        let report = pipeline(&dir).process(&extract(), sampler()).unwrap();
        assert_eq!(report.links, 4);

        let mut xml = String::new();
        GzDecoder::new(std::fs::File::open(dir.path().join("network.xml.gz")).unwrap())
            .read_to_string(&mut xml)
            .unwrap();
        assert!(xml.contains(">EPSG:31370</attribute>"));
        assert!(xml.contains("<node id=\"1\" x=\"150015\" y=\"170015\" z=\"42.5\" />"));
        assert!(xml.contains("<node id=\"3\" x=\"151000\" y=\"170015\" z=\"0\" />"));
        assert!(!xml.contains("<node id=\"4\""));
        assert_eq!(xml.matches("<link ").count(), 4);
    }

    #[test]
    fn car_only_drops_the_cycleway_before_cleaning() {
        let dir = tmp();
        let mut c = pipeline(&dir).config().clone();
        c.modes = ModeSet::of(&[TransportMode::Car]);
        let (net, report) = Pipeline::for_process(c).unwrap().build(&extract(), sampler()).unwrap();

        assert_eq!(report.clean, CleanReport::default());
        assert_eq!(net.node_count(), 3);
        assert!(net.links.iter().all(|l| l.modes.to_string() == "car"));
        // Nodes of unused ways are never created, so never merged.
        assert_eq!(report.elevation.merged(), 3);
    }

    #[test]
    fn dedicated_pool_gives_the_same_network() {
        let dir = tmp();
        let (shared, _) = pipeline(&dir).build(&extract(), sampler()).unwrap();

        let c = pipeline(&dir).config().clone().with_num_threads(2);
        let (pooled, _) = Pipeline::for_process(c).unwrap().build(&extract(), sampler()).unwrap();

        assert_eq!(shared.node_count(), pooled.node_count());
        for (a, b) in shared.nodes.iter().zip(&pooled.nodes) {
            assert_eq!(a.coord, b.coord);
        }
        for (a, b) in shared.links.iter().zip(&pooled.links) {
            assert_eq!((a.from, a.to, a.modes), (b.from, b.to, b.modes));
        }
    }

    #[test]
    fn in_memory_runs_check_modes_and_threads() {
        let dir = tmp();
        let c = pipeline(&dir).config().clone();

        let no_modes = c.clone().with_modes(ModeSet::default());
        assert!(matches!(Pipeline::for_process(no_modes), Err(PipelineError::Config(_))));

        let no_threads = c.with_num_threads(0);
        assert!(matches!(Pipeline::for_process(no_threads), Err(PipelineError::Config(_))));
    }

    #[test]
    fn mismatched_network_crs_is_rejected() {
        let dir = tmp();
        let mut c = pipeline(&dir).config().clone();
        c.network_crs = Crs::WGS84;
        c.source_crs = Crs::WGS84;
        // The sampler was built for Lambert 72 coordinates.
        let err = Pipeline::for_process(c).unwrap().build(&extract(), sampler()).unwrap_err();
        assert!(matches!(err, PipelineError::Elevation(_)));
    }
}
