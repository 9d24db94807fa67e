//! Elevation raster built from a triangular mesh.
//!
//! This module provides:
//! - [`Raster`] - Regular grid of elevation samples with running statistics
//! - [`Rasterizer`] - Mesh to raster conversion pass
//! - [`geometry`] - Containment and interpolation primitives

pub mod geometry;
pub mod rasterizer;

pub use rasterizer::{RasterConfig, RasterError, RasterWarning, Rasterization, Rasterizer};

use glam::DVec2;

use crate::mesh::{Mesh, PlanarBounds};

/// Integer extent of a raster in mesh coordinates.
///
/// Derived from the mesh bounds with unit granularity, independent of the
/// cell size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RasterBounds {
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
}

/// Largest number of cells whose sample buffer can be allocated.
const MAX_CELLS: usize = isize::MAX as usize / std::mem::size_of::<f64>();

impl RasterBounds {
    /// Round `bounds` outward to whole units.
    ///
    /// Fails on non-finite bounds and on coordinates outside the `i64` range.
    pub fn enclosing(bounds: &PlanarBounds) -> Result<Self, RasterError> {
        let coords = [bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max];
        if !coords.iter().all(|v| v.is_finite()) {
            return Err(RasterError::NonFiniteBounds);
        }

        let to_unit = |v: f64| {
            (v >= i64::MIN as f64 && v < i64::MAX as f64)
                .then_some(v as i64)
                .ok_or(RasterError::CoordinateOutOfRange(v))
        };
        Ok(Self {
            x_min: to_unit(bounds.x_min.floor())?,
            x_max: to_unit(bounds.x_max.ceil())?,
            y_min: to_unit(bounds.y_min.floor())?,
            y_max: to_unit(bounds.y_max.ceil())?,
        })
    }

    /// `None` when the extent does not fit in an `i64`.
    pub fn width(&self) -> Option<i64> {
        self.x_max.checked_sub(self.x_min)
    }

    /// `None` when the extent does not fit in an `i64`.
    pub fn height(&self) -> Option<i64> {
        self.y_max.checked_sub(self.y_min)
    }
}

/// Running min/max over every elevation written to a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZRange {
    min: f64,
    max: f64,
    count: usize,
}

impl Default for ZRange {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        }
    }
}

impl ZRange {
    pub fn observe(&mut self, z: f64) {
        if z > self.max {
            self.max = z;
        }
        if z < self.min {
            self.min = z;
        }
        self.count += 1;
    }

    pub fn merge(&mut self, other: &ZRange) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count += other.count;
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    /// Number of writes observed, including overwrites.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Regular elevation grid.
///
/// Samples are stored row-major. Row 0 is the northern (maximum y) edge and
/// sample `(row, col)` sits at `x_min + col * cell_size`,
/// `y_max - row * cell_size`. Cells no triangle covers keep the value `0.0`;
/// use [`Raster::is_covered`] to tell them apart from a real zero elevation.
///
/// `z_min`/`z_max` are a running range over every write, so a value that a
/// later triangle overwrote still counts. They are not recomputed from the
/// final grid.
#[derive(Debug, Clone)]
pub struct Raster {
    n_rows: usize,
    n_cols: usize,
    bounds: RasterBounds,
    cell_size: u32,
    data: Vec<f64>,
    covered: Vec<bool>,
    z_range: ZRange,
}

impl Default for Raster {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Raster {
    /// Zero-filled raster with the given dimensions.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            bounds: RasterBounds::default(),
            cell_size: 1,
            data: vec![0.0; n_rows * n_cols],
            covered: vec![false; n_rows * n_cols],
            z_range: ZRange::default(),
        }
    }

    /// Raster whose lattice covers `bounds` at the given stride.
    ///
    /// A zero `cell_size` is treated as 1; [`Rasterizer`] rejects it before
    /// getting here. Fails with [`RasterError::GridTooLarge`] when the post
    /// count overflows or the buffer could not be allocated.
    pub fn with_bounds(bounds: RasterBounds, cell_size: u32) -> Result<Self, RasterError> {
        let cell_size = cell_size.max(1);
        let step = i64::from(cell_size);
        let posts = |extent: Option<i64>| -> Option<usize> {
            let cells = extent?.max(0).checked_add(step - 1)? / step;
            usize::try_from(cells.checked_add(1)?).ok()
        };
        let too_large = || RasterError::GridTooLarge { bounds, cell_size };

        let n_rows = posts(bounds.height()).ok_or_else(too_large)?;
        let n_cols = posts(bounds.width()).ok_or_else(too_large)?;
        n_rows
            .checked_mul(n_cols)
            .filter(|&cells| cells <= MAX_CELLS)
            .ok_or_else(too_large)?;

        let mut raster = Self::new(n_rows, n_cols);
        raster.bounds = bounds;
        raster.cell_size = cell_size;
        Ok(raster)
    }

    /// Rasterize `mesh` into a new raster.
    pub fn from_mesh(mesh: &Mesh, cell_size: u32) -> Result<Rasterization, RasterError> {
        Rasterizer::new(RasterConfig { cell_size }).build(mesh)
    }

    /// Replace this raster's contents with a rasterization of `mesh`.
    ///
    /// Returns the triangles that were skipped. On error `self` is left
    /// untouched.
    pub fn build_from_mesh(
        &mut self,
        mesh: &Mesh,
        cell_size: u32,
    ) -> Result<Vec<RasterWarning>, RasterError> {
        let Rasterization { raster, warnings } = Self::from_mesh(mesh, cell_size)?;
        *self = raster;
        Ok(warnings)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn bounds(&self) -> RasterBounds {
        self.bounds
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        (row < self.n_rows).then(|| &self.data[row * self.n_cols..(row + 1) * self.n_cols])
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.offset(row, col).map(|i| self.data[i])
    }

    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        self.offset(row, col).is_some_and(|i| self.covered[i])
    }

    pub fn covered_count(&self) -> usize {
        self.covered.iter().filter(|&&c| c).count()
    }

    pub fn z_range(&self) -> ZRange {
        self.z_range
    }

    pub fn z_min(&self) -> Option<f64> {
        self.z_range.min()
    }

    pub fn z_max(&self) -> Option<f64> {
        self.z_range.max()
    }

    /// Mesh-space position of a lattice post.
    pub fn cell_position(&self, row: usize, col: usize) -> DVec2 {
        let step = f64::from(self.cell_size);
        DVec2::new(
            self.bounds.x_min as f64 + col as f64 * step,
            self.bounds.y_max as f64 - row as f64 * step,
        )
    }

    /// Nearest lattice post to a mesh-space point, as `(row, col)`.
    pub fn index_of(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let step = f64::from(self.cell_size);
        let col = ((x - self.bounds.x_min as f64) / step).round();
        let row = ((self.bounds.y_max as f64 - y) / step).round();

        if col < 0.0 || row < 0.0 || col >= self.n_cols as f64 || row >= self.n_rows as f64 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    /// Elevation at the lattice post nearest to `(x, y)`.
    pub fn sample_at(&self, x: f64, y: f64) -> Option<f64> {
        self.index_of(x, y).and_then(|(row, col)| self.get(row, col))
    }

    /// Store a sample and fold it into the statistics.
    ///
    /// Returns `false` and changes nothing when the index is outside the grid.
    pub fn write(&mut self, row: usize, col: usize, z: f64) -> bool {
        let Some(i) = self.offset(row, col) else {
            return false;
        };
        self.store(i, z);
        self.z_range.observe(z);
        true
    }

    /// Store a sample without touching the statistics.
    pub(crate) fn store(&mut self, index: usize, z: f64) {
        self.data[index] = z;
        self.covered[index] = true;
    }

    pub(crate) fn merge_z_range(&mut self, range: &ZRange) {
        self.z_range.merge(range);
    }

    pub(crate) fn offset(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.n_rows && col < self.n_cols).then(|| row * self.n_cols + col)
    }
}
