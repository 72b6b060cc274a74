//! Unit tests for bn-raster.
//!
//! Rasters are built in memory; the GeoTIFF tests write their fixture with
//! the `tiff` encoder into a temp dir.

#[cfg(test)]
mod helpers {
    use crate::{ChunkedGrid, ElevationRaster, GeoTransform};

    pub const NODATA: f32 = -9999.0;

    /// 4 columns × 3 rows of 10 m cells, top-left corner at (1000, 2000).
    ///
    /// ```text
    ///   row 0:  10.0  11.0  12.0  13.0
    ///   row 1:  20.0  42.5  NODATA 23.0
    ///   row 2:  30.0  31.0  NaN   33.0
    /// ```
    pub fn small_raster() -> ElevationRaster {
        let cells = vec![
            10.0, 11.0, 12.0,   13.0,
            20.0, 42.5, NODATA, 23.0,
            30.0, 31.0, f32::NAN, 33.0,
        ];
        let grid = ChunkedGrid::from_cells(4, 3, cells).unwrap();
        ElevationRaster::new(grid, GeoTransform::new(1_000.0, 2_000.0, 10.0, 10.0))
            .with_nodata(NODATA)
    }
}

// ── Grid & transform ──────────────────────────────────────────────────────────

#[cfg(test)]
mod grid {
    use bn_core::Coord;

    use crate::{ChunkedGrid, GeoTransform, RasterError, SampleFailure};

    #[test]
    fn cell_index_floors() {
        let t = GeoTransform::new(1_000.0, 2_000.0, 10.0, 10.0);
        assert_eq!(t.cell(Coord::new(1_000.0, 2_000.0)), (0.0, 0.0));
        assert_eq!(t.cell(Coord::new(1_019.9, 1_980.1)), (1.0, 1.0));
        assert_eq!(t.cell(Coord::new(999.0, 2_001.0)), (-1.0, -1.0));
    }

    #[test]
    fn cell_center_inverts_cell() {
        let t = GeoTransform::new(1_000.0, 2_000.0, 10.0, 10.0);
        let c = t.cell_center(2, 1);
        assert_eq!(c, Coord::new(1_025.0, 1_985.0));
        assert_eq!(t.cell(c), (2.0, 1.0));
    }

    #[test]
    fn from_cells_checks_size() {
        let err = ChunkedGrid::from_cells(2, 2, vec![1.0; 3]).unwrap_err();
        assert!(matches!(err, RasterError::GridSize { expected: 4, got: 3 }));
    }

    #[test]
    fn chunked_lookup_across_chunks() {
        // 5×3 grid in 2×2 chunks: 3 across, 2 down, edge chunks cropped.
        let mut g = ChunkedGrid::with_chunking(5, 3, 2, 2);
        assert_eq!(g.chunk_count(), 6);
        assert_eq!(g.chunk_data_dimensions(2), (1, 2));
        assert_eq!(g.chunk_data_dimensions(5), (1, 1));

        for index in 0..g.chunk_count() {
            let (w, h) = g.chunk_data_dimensions(index);
            let values = (0..w * h).map(|i| (index * 100) as f32 + i as f32).collect();
            g.set_chunk(index, w as usize, values).unwrap();
        }
        assert_eq!(g.get(0, 0), Ok(0.0));
        assert_eq!(g.get(3, 1), Ok(103.0)); // chunk 1, local (1, 1)
        assert_eq!(g.get(4, 2), Ok(500.0)); // chunk 5, local (0, 0)
        assert_eq!(g.get(5, 0), Err(SampleFailure::OutsideGrid));
    }

    #[test]
    fn unfilled_chunk_is_missing() {
        let mut g = ChunkedGrid::with_chunking(4, 4, 2, 2);
        g.set_chunk(0, 2, vec![1.0; 4]).unwrap();
        assert_eq!(g.missing_chunks(), 3);
        assert_eq!(g.get(1, 1), Ok(1.0));
        assert_eq!(g.get(3, 3), Err(SampleFailure::MissingGrid));
    }

    #[test]
    fn set_chunk_rejects_short_buffers() {
        let mut g = ChunkedGrid::with_chunking(4, 4, 2, 2);
        assert!(g.set_chunk(0, 2, vec![1.0; 3]).is_err());
        assert!(g.set_chunk(9, 2, vec![1.0; 4]).is_err());
    }
}

// ── Sampling ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sample {
    use bn_core::Coord;

    use crate::{ChunkedGrid, ElevationRaster, ElevationSource, GeoTransform, SampleFailure};

    use super::helpers::small_raster;

    #[test]
    fn inside_returns_cell_value() {
        let r = small_raster();
        assert_eq!(r.sample(Coord::new(1_015.0, 1_985.0)), Ok(42.5));
        assert_eq!(r.sample(Coord::new(1_000.0, 2_000.0)), Ok(10.0));
    }

    #[test]
    fn outside_extent_is_reported() {
        let r = small_raster();
        assert_eq!(r.sample(Coord::new(999.9, 1_985.0)), Err(SampleFailure::OutsideGrid));
        assert_eq!(r.sample(Coord::new(1_040.0, 1_985.0)), Err(SampleFailure::OutsideGrid));
        assert_eq!(r.sample(Coord::new(1_015.0, 1_970.0)), Err(SampleFailure::OutsideGrid));
        assert_eq!(r.sample(Coord::new(4.35, 50.85)), Err(SampleFailure::OutsideGrid));
    }

    #[test]
    fn nodata_sentinel_is_reported() {
        let r = small_raster();
        assert_eq!(r.sample(Coord::new(1_025.0, 1_985.0)), Err(SampleFailure::NoData));
    }

    #[test]
    fn nan_cell_is_nodata() {
        let r = small_raster();
        assert_eq!(r.sample(Coord::new(1_025.0, 1_975.0)), Err(SampleFailure::NoData));
    }

    #[test]
    fn non_finite_coordinate_is_invalid() {
        let r = small_raster();
        assert_eq!(
            r.sample(Coord::new(f64::NAN, 1_985.0)),
            Err(SampleFailure::InvalidCoordinate)
        );
    }

    #[test]
    fn degenerate_transform_locates_nothing() {
        let grid = ChunkedGrid::from_cells(2, 2, vec![7.0, 8.0, 9.0, 10.0]).unwrap();
        let r = ElevationRaster::new(grid, GeoTransform::new(1_000.0, 2_000.0, 0.0, 0.0));
        assert_eq!(r.sample(Coord::new(1_000.0, 2_000.0)), Err(SampleFailure::OutsideGrid));
        assert_eq!(r.sample(Coord::new(1_005.0, 1_995.0)), Err(SampleFailure::OutsideGrid));
    }

    #[test]
    fn missing_chunk_is_reported() {
        let mut g = ChunkedGrid::with_chunking(4, 2, 2, 2);
        g.set_chunk(0, 2, vec![5.0; 4]).unwrap();
        let r = ElevationRaster::new(g, GeoTransform::new(0.0, 20.0, 10.0, 10.0));
        assert_eq!(r.sample(Coord::new(5.0, 15.0)), Ok(5.0));
        assert_eq!(r.sample(Coord::new(25.0, 15.0)), Err(SampleFailure::MissingGrid));
    }

    #[test]
    fn extent_covers_grid() {
        assert_eq!(small_raster().extent(), (1_000.0, 1_970.0, 1_040.0, 2_000.0));
    }

    #[test]
    fn source_trait_matches_sample() {
        let r = small_raster();
        let c = Coord::new(1_035.0, 1_975.0);
        assert_eq!(r.elevation(c), r.sample(c));
        assert_eq!((&r).elevation(c), Ok(33.0));
    }
}

// ── RasterSampler ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod sampler {
    use bn_core::{Coord, Crs};
    use bn_crs::{CoordinateTransformation, ProjTransformation};

    use crate::{ChunkedGrid, ElevationRaster, GeoTransform, RasterSampler, SampleFailure};

    use super::helpers::small_raster;

    #[test]
    fn same_system_samples_directly() {
        let raster = small_raster().with_crs(Crs::BELGIAN_LAMBERT_72);
        let s = RasterSampler::new(raster, Crs::BELGIAN_LAMBERT_72).unwrap();
        assert_eq!(s.get_elevation(Coord::new(1_015.0, 1_985.0)), Ok(42.5));
    }

    #[test]
    fn unrecorded_system_is_assumed_working() {
        let s = RasterSampler::new(small_raster(), Crs::BELGIAN_LAMBERT_72).unwrap();
        assert_eq!(s.get_elevation(Coord::new(1_005.0, 1_995.0)), Ok(10.0));
    }

    #[test]
    fn working_coordinates_are_projected_into_raster_system() {
        // A WGS84 raster of 0.01° cells around Brussels, queried in Lambert 72.
        let grid = ChunkedGrid::from_cells(2, 2, vec![55.0, 56.0, 57.0, 58.0]).unwrap();
        let raster = ElevationRaster::new(grid, GeoTransform::new(4.34, 50.86, 0.01, 0.01))
            .with_crs(Crs::WGS84);
        let s = RasterSampler::new(raster, Crs::BELGIAN_LAMBERT_72).unwrap();

        let to_lambert = ProjTransformation::new(&Crs::WGS84, &Crs::BELGIAN_LAMBERT_72).unwrap();
        let inside = to_lambert.try_transform(Coord::new(4.355, 50.845)).unwrap();
        assert_eq!(s.get_elevation(inside), Ok(58.0));

        let far = to_lambert.try_transform(Coord::new(5.5, 50.5)).unwrap();
        assert_eq!(s.get_elevation(far), Err(SampleFailure::OutsideGrid));
    }

    #[test]
    fn unknown_raster_system_fails_construction() {
        let raster = small_raster().with_crs(Crs::Epsg(99_999));
        assert!(RasterSampler::new(raster, Crs::BELGIAN_LAMBERT_72).is_err());
    }
}

// ── GeoTIFF ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod geotiff {
    use std::fs::File;
    use std::path::Path;

    use tiff::encoder::{colortype, TiffEncoder};
    use tiff::tags::Tag;

    use bn_core::{Coord, Crs};

    use crate::geotiff::{
        check_pixel_size, crs_from_keys, from_model_transformation, parse_geo_keys, parse_nodata,
    };
    use crate::{read_geotiff, GeoTransform, RasterError, RasterSampler, SampleFailure};

    /// 3×2 Float32 GeoTIFF in Lambert 72 with 5 m cells at (150 000, 170 010).
    fn write_fixture(path: &Path, with_georef: bool) {
        write_scaled_fixture(path, with_georef.then_some(5.0));
    }

    fn write_scaled_fixture(path: &Path, pixel_size: Option<f64>) {
        let data: [f32; 6] = [
            40.0, 42.5, -9999.0,
            41.0, 43.0, 44.0,
        ];
        let mut enc = TiffEncoder::new(File::create(path).unwrap()).unwrap();
        let mut image = enc.new_image::<colortype::Gray32Float>(3, 2).unwrap();
        if let Some(size) = pixel_size {
            let dir = image.encoder();
            dir.write_tag(Tag::ModelPixelScaleTag, &[size, size, 0.0][..]).unwrap();
            dir.write_tag(Tag::ModelTiepointTag, &[0.0f64, 0.0, 0.0, 150_000.0, 170_010.0, 0.0][..])
                .unwrap();
            dir.write_tag(Tag::GeoKeyDirectoryTag, &[1u16, 1, 0, 1, 3072, 0, 1, 31370][..]).unwrap();
            dir.write_tag(Tag::GdalNodata, "-9999").unwrap();
        }
        image.write_data(&data).unwrap();
    }

    #[test]
    fn read_georeferenced_float_tiff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dem.tif");
        write_fixture(&path, true);

        let raster = read_geotiff(&path).unwrap();
        assert_eq!(raster.crs(), Some(&Crs::BELGIAN_LAMBERT_72));
        assert_eq!(raster.nodata(), Some(-9999.0));
        assert_eq!(raster.extent(), (150_000.0, 170_000.0, 150_015.0, 170_010.0));

        assert_eq!(raster.sample(Coord::new(150_007.0, 170_008.0)), Ok(42.5));
        assert_eq!(raster.sample(Coord::new(150_012.0, 170_008.0)), Err(SampleFailure::NoData));
        assert_eq!(raster.sample(Coord::new(150_012.0, 170_002.0)), Ok(44.0));
        assert_eq!(raster.sample(Coord::new(150_020.0, 170_002.0)), Err(SampleFailure::OutsideGrid));
    }

    #[test]
    fn open_sampler_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dem.tif");
        write_fixture(&path, true);

        let s = RasterSampler::open(&path, Crs::BELGIAN_LAMBERT_72, None).unwrap();
        assert_eq!(s.get_elevation(Coord::new(150_002.0, 170_002.0)), Ok(41.0));
    }

    #[test]
    fn missing_georeference_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.tif");
        write_fixture(&path, false);
        assert!(matches!(read_geotiff(&path), Err(RasterError::MissingGeoreference(_))));
    }

    #[test]
    fn zero_pixel_scale_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.tif");
        write_scaled_fixture(&path, Some(0.0));
        assert!(matches!(read_geotiff(&path), Err(RasterError::UnsupportedGeoreference(_))));
        assert!(RasterSampler::open(&path, Crs::BELGIAN_LAMBERT_72, None).is_err());
    }

    #[test]
    fn unusable_pixel_sizes_are_rejected() {
        for (w, h) in [(0.0, 5.0), (5.0, -5.0), (f64::NAN, 5.0), (5.0, f64::INFINITY)] {
            let t = GeoTransform::new(150_000.0, 170_010.0, w, h);
            assert!(
                matches!(check_pixel_size(t), Err(RasterError::UnsupportedGeoreference(_))),
                "{w} x {h} accepted"
            );
        }
        assert!(check_pixel_size(GeoTransform::new(0.0, 0.0, 5.0, 5.0)).is_ok());
    }

    #[test]
    fn model_transformation_without_scale_is_rejected() {
        let m = [
            0.0, 0.0, 0.0, 150_000.0,
            0.0, -5.0, 0.0, 170_010.0,
        ];
        assert!(matches!(from_model_transformation(&m), Err(RasterError::UnsupportedGeoreference(_))));
    }

    #[test]
    fn missing_file_is_fatal() {
        let result = read_geotiff(Path::new("/nonexistent/dem.tif"));
        assert!(matches!(result, Err(RasterError::Io(_))));
    }

    #[test]
    fn geo_keys_parse_inline_values_only() {
        // Two inline keys, one pointing into GeoDoubleParams (location 34736).
        let dir = [1, 1, 0, 3, 1025, 0, 1, 1, 3072, 0, 1, 31370, 2057, 34736, 1, 0];
        let keys = parse_geo_keys(&dir);
        assert_eq!(keys.get(&1025), Some(&1));
        assert_eq!(keys.get(&3072), Some(&31370));
        assert!(!keys.contains_key(&2057));
        assert_eq!(crs_from_keys(&keys), Some(Crs::Epsg(31370)));
    }

    #[test]
    fn user_defined_system_is_unknown() {
        let keys = parse_geo_keys(&[1, 1, 0, 1, 3072, 0, 1, 32767]);
        assert_eq!(crs_from_keys(&keys), None);
        assert_eq!(crs_from_keys(&parse_geo_keys(&[1, 1])), None);
    }

    #[test]
    fn geographic_key_used_when_not_projected() {
        let keys = parse_geo_keys(&[1, 1, 0, 1, 2048, 0, 1, 4326]);
        assert_eq!(crs_from_keys(&keys), Some(Crs::WGS84));
    }

    #[test]
    fn model_transformation_north_up() {
        let m = [
            5.0, 0.0, 0.0, 150_000.0,
            0.0, -5.0, 0.0, 170_010.0,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        let t = from_model_transformation(&m).unwrap();
        assert_eq!((t.origin_x, t.origin_y, t.pixel_width, t.pixel_height), (150_000.0, 170_010.0, 5.0, 5.0));
    }

    #[test]
    fn model_transformation_rotated_is_rejected() {
        let m = [5.0, 0.5, 0.0, 0.0, 0.5, -5.0, 0.0, 0.0];
        assert!(from_model_transformation(&m).is_err());
    }

    #[test]
    fn nodata_text_variants() {
        assert_eq!(parse_nodata("-9999\0"), Some(-9999.0));
        assert_eq!(parse_nodata(" -3.4028234663852886e+38 "), Some(-3.4028234663852886e+38));
        assert!(parse_nodata("nan").unwrap().is_nan());
        assert_eq!(parse_nodata("none"), None);
    }
}
