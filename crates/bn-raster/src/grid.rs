//! In-memory elevation grids.
//!
//! # Data layout
//!
//! Cells are stored in **chunks** mirroring the GeoTIFF strips or tiles they
//! were decoded from.  Given a cell `(col, row)`:
//!
//! ```text
//! chunk  = (row / chunk_height) * chunks_across + col / chunk_width
//! offset = (row % chunk_height) * stride[chunk] + col % chunk_width
//! ```
//!
//! A chunk that was absent from the file, or failed to decode, is kept as
//! `None`.  Looking up a cell inside it is a
//! [`SampleFailure::MissingGrid`], distinct from a cell outside the extent.
//!
//! Values are held as `f32`: one decimal metre of elevation needs far less
//! than 24 bits of mantissa, and national DEMs get large.

use bn_core::{Coord, Crs};

use crate::sampler::{ElevationSample, ElevationSource, SampleFailure};
use crate::{RasterError, RasterResult};

// ── GeoTransform ──────────────────────────────────────────────────────────────

/// Affine mapping between world coordinates and cell indices for a
/// north-up raster.
///
/// `(origin_x, origin_y)` is the **outer corner** of the top-left cell.
/// `pixel_height` is positive; rows grow southwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoTransform {
    pub origin_x:     f64,
    pub origin_y:     f64,
    pub pixel_width:  f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self { origin_x, origin_y, pixel_width, pixel_height }
    }

    /// Fractional `(col, row)` position of `coord`, floored to the cell that
    /// contains it.  May be negative or beyond the grid.
    #[inline]
    pub fn cell(&self, coord: Coord) -> (f64, f64) {
        let col = ((coord.x - self.origin_x) / self.pixel_width).floor();
        let row = ((self.origin_y - coord.y) / self.pixel_height).floor();
        (col, row)
    }

    /// World coordinate of the centre of cell `(col, row)`.
    pub fn cell_center(&self, col: u32, row: u32) -> Coord {
        Coord::new(
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y - (row as f64 + 0.5) * self.pixel_height,
        )
    }
}

// ── ChunkedGrid ───────────────────────────────────────────────────────────────

/// One decoded strip or tile.
#[derive(Clone, Debug)]
struct Chunk {
    /// Cells per row inside `values`; may exceed the data width for padded
    /// edge tiles.
    stride: usize,
    values: Box<[f32]>,
}

/// A `width × height` grid of `f32` cells stored in fixed-size chunks.
#[derive(Clone, Debug)]
pub struct ChunkedGrid {
    width:         u32,
    height:        u32,
    chunk_width:   u32,
    chunk_height:  u32,
    chunks_across: u32,
    chunks:        Vec<Option<Chunk>>,
}

impl ChunkedGrid {
    /// A grid held as a single row-major chunk.
    ///
    /// # Errors
    ///
    /// [`RasterError::GridSize`] if `cells.len() != width * height`.
    pub fn from_cells(width: u32, height: u32, cells: Vec<f32>) -> RasterResult<Self> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(RasterError::GridSize { expected, got: cells.len() });
        }
        Ok(Self {
            width,
            height,
            chunk_width:   width.max(1),
            chunk_height:  height.max(1),
            chunks_across: 1,
            chunks:        vec![Some(Chunk { stride: width as usize, values: cells.into() })],
        })
    }

    /// Start an empty grid; every chunk is missing until
    /// [`set_chunk`](Self::set_chunk) fills it.
    pub fn with_chunking(width: u32, height: u32, chunk_width: u32, chunk_height: u32) -> Self {
        let chunk_width  = chunk_width.max(1);
        let chunk_height = chunk_height.max(1);
        let chunks_across = width.div_ceil(chunk_width);
        let chunks_down   = height.div_ceil(chunk_height);
        Self {
            width,
            height,
            chunk_width,
            chunk_height,
            chunks_across,
            chunks: vec![None; (chunks_across * chunks_down) as usize],
        }
    }

    /// Install the cells of chunk `index`, row-major with `stride` cells per
    /// row.
    ///
    /// # Errors
    ///
    /// [`RasterError::GridSize`] if `index` is out of range or `values` is
    /// too short for the chunk's rows at the given stride.
    pub fn set_chunk(&mut self, index: usize, stride: usize, values: Vec<f32>) -> RasterResult<()> {
        let chunk_count = self.chunks.len();
        if index >= chunk_count {
            return Err(RasterError::GridSize { expected: chunk_count, got: index + 1 });
        }
        let (cols, rows) = self.chunk_data_dimensions(index);
        if stride < cols as usize {
            return Err(RasterError::GridSize { expected: cols as usize, got: stride });
        }
        let needed = match rows {
            0    => 0,
            rows => stride * (rows as usize - 1) + cols as usize,
        };
        if values.len() < needed {
            return Err(RasterError::GridSize { expected: needed, got: values.len() });
        }
        self.chunks[index] = Some(Chunk { stride, values: values.into() });
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of chunks that are absent.
    pub fn missing_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_none()).count()
    }

    /// Width and height of the data actually covered by chunk `index`
    /// (edge chunks are cropped to the grid).
    pub fn chunk_data_dimensions(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        let col0 = (index % self.chunks_across) * self.chunk_width;
        let row0 = (index / self.chunks_across) * self.chunk_height;
        (
            self.chunk_width.min(self.width.saturating_sub(col0)),
            self.chunk_height.min(self.height.saturating_sub(row0)),
        )
    }

    /// Value of cell `(col, row)`.
    ///
    /// `Err(OutsideGrid)` for indices beyond the extent, `Err(MissingGrid)`
    /// when the covering chunk is absent.  No-data is *not* judged here.
    pub fn get(&self, col: u32, row: u32) -> Result<f32, SampleFailure> {
        if col >= self.width || row >= self.height {
            return Err(SampleFailure::OutsideGrid);
        }
        let index = ((row / self.chunk_height) * self.chunks_across + col / self.chunk_width) as usize;
        let chunk = self.chunks[index].as_ref().ok_or(SampleFailure::MissingGrid)?;
        let offset = (row % self.chunk_height) as usize * chunk.stride + (col % self.chunk_width) as usize;
        chunk.values.get(offset).copied().ok_or(SampleFailure::MissingGrid)
    }
}

// ── ElevationRaster ───────────────────────────────────────────────────────────

/// A georeferenced single-band elevation grid.
///
/// Coordinates passed to [`sample`](Self::sample) must already be in the
/// raster's own reference system; [`RasterSampler`](crate::RasterSampler)
/// handles the conversion from a network's working system.
#[derive(Clone, Debug)]
pub struct ElevationRaster {
    grid:      ChunkedGrid,
    transform: GeoTransform,
    nodata:    Option<f32>,
    crs:       Option<Crs>,
}

impl ElevationRaster {
    pub fn new(grid: ChunkedGrid, transform: GeoTransform) -> Self {
        Self { grid, transform, nodata: None, crs: None }
    }

    /// Declare the sentinel value marking cells without a measurement.
    pub fn with_nodata(mut self, nodata: f32) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn grid(&self) -> &ChunkedGrid {
        &self.grid
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn nodata(&self) -> Option<f32> {
        self.nodata
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// `(min_x, min_y, max_x, max_y)` of the covered area.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        let t = &self.transform;
        let max_x = t.origin_x + self.grid.width() as f64 * t.pixel_width;
        let min_y = t.origin_y - self.grid.height() as f64 * t.pixel_height;
        (t.origin_x, min_y, max_x, t.origin_y)
    }

    /// Sample the cell containing `coord` (raster reference system).
    pub fn sample(&self, coord: Coord) -> ElevationSample {
        if !coord.is_finite() {
            return Err(SampleFailure::InvalidCoordinate);
        }
        let (col, row) = self.transform.cell(coord);
        if !col.is_finite() || !row.is_finite() {
            return Err(SampleFailure::OutsideGrid);
        }
        if col < 0.0 || row < 0.0 || col >= self.grid.width() as f64 || row >= self.grid.height() as f64 {
            return Err(SampleFailure::OutsideGrid);
        }

        let value = self.grid.get(col as u32, row as u32)?;
        if value.is_nan() || self.nodata == Some(value) {
            return Err(SampleFailure::NoData);
        }
        Ok(f64::from(value))
    }
}

impl ElevationSource for ElevationRaster {
    fn elevation(&self, coord: Coord) -> ElevationSample {
        self.sample(coord)
    }
}
