//! GeoTIFF loader.
//!
//! # What is read
//!
//! | Tag / key                         | Used for                              |
//! |-----------------------------------|---------------------------------------|
//! | `ModelPixelScale` + `ModelTiepoint` | `GeoTransform` (preferred)          |
//! | `ModelTransformation`             | `GeoTransform` (north-up only)        |
//! | `GTRasterTypeGeoKey` (1025)       | half-cell shift for `PixelIsPoint`    |
//! | `ProjectedCSTypeGeoKey` (3072)    | raster `Crs`                          |
//! | `GeographicTypeGeoKey` (2048)     | raster `Crs` when not projected       |
//! | `GDAL_NODATA` (42113)             | no-data sentinel                      |
//!
//! Only the first band of the first image is loaded.  Strips and tiles are
//! both handled; a chunk that fails to decode is logged and left missing
//! rather than failing the whole load.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::{debug, warn};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::{ColorType, TiffError};

use bn_core::Crs;

use crate::{ChunkedGrid, ElevationRaster, GeoTransform, RasterError, RasterResult};

const KEY_RASTER_TYPE:     u16 = 1025;
const KEY_GEOGRAPHIC_TYPE: u16 = 2048;
const KEY_PROJECTED_TYPE:  u16 = 3072;

const RASTER_PIXEL_IS_POINT: u16 = 2;
/// GeoKey value meaning "user-defined", i.e. not an EPSG code.
const USER_DEFINED: u16 = 32767;

/// Load the elevation raster stored in the GeoTIFF at `path`.
///
/// # Errors
///
/// [`RasterError::Io`]/[`RasterError::Tiff`] for unreadable files,
/// [`RasterError::MissingGeoreference`] without georeferencing tags,
/// [`RasterError::UnsupportedLayout`] for multi-band images and
/// [`RasterError::UnsupportedSampleFormat`] for sample types other than
/// integers and 32/64-bit floats.
pub fn read_geotiff(path: &Path) -> RasterResult<ElevationRaster> {
    let mut decoder = Decoder::new(BufReader::new(File::open(path)?))?;

    let (width, height) = decoder.dimensions()?;
    match decoder.colortype()? {
        ColorType::Gray(_) => {}
        other => return Err(RasterError::UnsupportedLayout(format!("{other:?}"))),
    }

    let geo_keys  = read_geo_keys(&mut decoder)?;
    let transform = read_geo_transform(&mut decoder, &geo_keys)?
        .ok_or_else(|| RasterError::MissingGeoreference(path.to_path_buf()))?;
    let nodata    = read_nodata(&mut decoder)?;
    let crs       = crs_from_keys(&geo_keys);

    let grid = read_grid(&mut decoder, width, height)?;
    if grid.missing_chunks() > 0 {
        warn!(
            "{}: {} of {} chunks could not be decoded",
            path.display(),
            grid.missing_chunks(),
            grid.chunk_count()
        );
    }
    debug!(
        "loaded {}: {width}x{height} cells, crs {:?}, nodata {nodata:?}",
        path.display(),
        crs
    );

    let mut raster = ElevationRaster::new(grid, transform);
    if let Some(nodata) = nodata {
        raster = raster.with_nodata(nodata as f32);
    }
    if let Some(crs) = crs {
        raster = raster.with_crs(crs);
    }
    Ok(raster)
}

// ── Cells ─────────────────────────────────────────────────────────────────────

fn read_grid<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    width: u32,
    height: u32,
) -> RasterResult<ChunkedGrid> {
    let (chunk_width, chunk_height) = decoder.chunk_dimensions();
    let mut grid = ChunkedGrid::with_chunking(width, height, chunk_width, chunk_height);

    for index in 0..grid.chunk_count() {
        let decoded = match decoder.read_chunk(index as u32) {
            Ok(decoded) => decoded,
            Err(TiffError::UnsupportedError(e)) => {
                return Err(RasterError::UnsupportedSampleFormat(e.to_string()));
            }
            Err(e) => {
                warn!("chunk {index}: {e}");
                continue;
            }
        };
        let values = widen(decoded)?;

        // Edge tiles come back either padded to the full tile or cropped to
        // the data they cover.
        let (data_width, data_height) = grid.chunk_data_dimensions(index);
        let stride = if values.len() == chunk_width as usize * chunk_height as usize {
            chunk_width as usize
        } else if values.len() == data_width as usize * data_height as usize {
            data_width as usize
        } else {
            warn!("chunk {index}: unexpected length {}", values.len());
            continue;
        };
        grid.set_chunk(index, stride, values)?;
    }
    Ok(grid)
}

fn widen(decoded: DecodingResult) -> RasterResult<Vec<f32>> {
    let values = match decoded {
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v)  => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U8(v)  => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
        #[allow(unreachable_patterns)]
        _ => return Err(RasterError::UnsupportedSampleFormat("unknown sample type".into())),
    };
    Ok(values)
}

// ── Georeferencing ────────────────────────────────────────────────────────────

/// GeoKeyDirectory entries whose value is stored inline (`TIFFTagLocation`
/// = 0), keyed by GeoKey id.
fn read_geo_keys<R: Read + Seek>(decoder: &mut Decoder<R>) -> RasterResult<HashMap<u16, u16>> {
    let Some(value) = decoder.find_tag(Tag::GeoKeyDirectoryTag)? else {
        return Ok(HashMap::new());
    };
    Ok(parse_geo_keys(&value.into_u16_vec()?))
}

/// Parse a GeoKeyDirectory: a 4-value header whose last entry is the key
/// count, then `[key id, location, count, value]` per key.
pub(crate) fn parse_geo_keys(directory: &[u16]) -> HashMap<u16, u16> {
    let Some(&key_count) = directory.get(3) else {
        return HashMap::new();
    };
    directory[4..]
        .chunks_exact(4)
        .take(key_count as usize)
        .filter(|entry| entry[1] == 0)
        .map(|entry| (entry[0], entry[3]))
        .collect()
}

pub(crate) fn crs_from_keys(keys: &HashMap<u16, u16>) -> Option<Crs> {
    [KEY_PROJECTED_TYPE, KEY_GEOGRAPHIC_TYPE]
        .iter()
        .filter_map(|key| keys.get(key))
        .find(|&&code| code != 0 && code != USER_DEFINED)
        .map(|&code| Crs::Epsg(u32::from(code)))
}

fn read_geo_transform<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    keys: &HashMap<u16, u16>,
) -> RasterResult<Option<GeoTransform>> {
    let scale    = read_f64s(decoder, Tag::ModelPixelScaleTag)?;
    let tiepoint = read_f64s(decoder, Tag::ModelTiepointTag)?;

    let transform = match (scale, tiepoint) {
        (Some(scale), Some(tie)) if scale.len() >= 2 && tie.len() >= 6 => {
            let (sx, sy) = (scale[0], scale[1]);
            check_pixel_size(GeoTransform::new(tie[3] - tie[0] * sx, tie[4] + tie[1] * sy, sx, sy))?
        }
        _ => match read_f64s(decoder, Tag::ModelTransformationTag)? {
            Some(m) => from_model_transformation(&m)?,
            None    => return Ok(None),
        },
    };

    if keys.get(&KEY_RASTER_TYPE) == Some(&RASTER_PIXEL_IS_POINT) {
        // Tie points name cell centres; move the origin to the outer corner.
        return Ok(Some(GeoTransform::new(
            transform.origin_x - transform.pixel_width * 0.5,
            transform.origin_y + transform.pixel_height * 0.5,
            transform.pixel_width,
            transform.pixel_height,
        )));
    }
    Ok(Some(transform))
}

/// Interpret a 4×4 row-major `ModelTransformation` matrix.
pub(crate) fn from_model_transformation(m: &[f64]) -> RasterResult<GeoTransform> {
    if m.len() < 8 {
        return Err(RasterError::UnsupportedGeoreference(format!(
            "ModelTransformation has {} values",
            m.len()
        )));
    }
    let (a, b, d) = (m[0], m[1], m[3]);
    let (e, f, h) = (m[4], m[5], m[7]);
    if b != 0.0 || e != 0.0 || f >= 0.0 {
        return Err(RasterError::UnsupportedGeoreference(
            "rotated or south-up rasters are not supported".into(),
        ));
    }
    check_pixel_size(GeoTransform::new(d, h, a, -f))
}

/// Reject transforms whose cells have no usable size.
pub(crate) fn check_pixel_size(t: GeoTransform) -> RasterResult<GeoTransform> {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(t.pixel_width) || !usable(t.pixel_height) {
        return Err(RasterError::UnsupportedGeoreference(format!(
            "pixel size {} x {} must be finite and positive",
            t.pixel_width, t.pixel_height
        )));
    }
    Ok(t)
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> RasterResult<Option<f64>> {
    let Some(value) = decoder.find_tag(Tag::GdalNodata)? else {
        return Ok(None);
    };
    Ok(parse_nodata(&value.into_string()?))
}

pub(crate) fn parse_nodata(text: &str) -> Option<f64> {
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match text.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring unparsable GDAL_NODATA {text:?}");
            None
        }
    }
}

fn read_f64s<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> RasterResult<Option<Vec<f64>>> {
    match decoder.find_tag(tag)? {
        Some(value) => Ok(Some(value.into_f64_vec()?)),
        None        => Ok(None),
    }
}
