use std::time::Instant;

use glam::DVec2;
use thiserror::Error;

use super::geometry::{contains, doubled_area, interpolate_elevation};
use super::{Raster, RasterBounds, ZRange};
use crate::mesh::Mesh;

#[derive(Error, Debug, PartialEq)]
pub enum RasterError {
    #[error("Mesh is empty ({vertices} vertices, {triangles} triangles)")]
    EmptyMesh { vertices: usize, triangles: usize },
    #[error("Cell size must be at least 1")]
    InvalidCellSize,
    #[error("Mesh bounds are not finite")]
    NonFiniteBounds,
    #[error("Coordinate {0} is outside the supported range")]
    CoordinateOutOfRange(f64),
    #[error("Grid for bounds {bounds:?} at cell size {cell_size} is too large")]
    GridTooLarge {
        bounds: RasterBounds,
        cell_size: u32,
    },
}

/// A triangle that was skipped. The rest of the pass is unaffected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterWarning {
    #[error("Triangle {triangle} is degenerate (zero area), skipped")]
    DegenerateTriangle { triangle: usize },
}

/// Settings for a rasterization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterConfig {
    /// Distance between lattice posts, in mesh units
    pub cell_size: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self { cell_size: 1 }
    }
}

/// Completed raster plus the triangles that could not be rasterized.
#[derive(Debug, Clone)]
pub struct Rasterization {
    pub raster: Raster,
    pub warnings: Vec<RasterWarning>,
}

/// Converts a triangle mesh into an elevation raster.
///
/// Each triangle only visits the lattice posts inside its own bounding box.
/// Posts on a triangle's boundary belong to it, so where triangles share an
/// edge or overlap, the later triangle in mesh order wins.
pub struct Rasterizer {
    pub config: RasterConfig,
}

impl Rasterizer {
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, mesh: &Mesh) -> Result<Rasterization, RasterError> {
        if self.config.cell_size == 0 {
            return Err(RasterError::InvalidCellSize);
        }
        let empty = || RasterError::EmptyMesh {
            vertices: mesh.vertices().len(),
            triangles: mesh.triangles().len(),
        };
        if mesh.is_empty() {
            return Err(empty());
        }
        let bounds = mesh.bounds().ok_or_else(empty)?;

        let mut raster =
            Raster::with_bounds(RasterBounds::enclosing(&bounds)?, self.config.cell_size)?;
        log::info!(
            "Rasterizing {} triangles into {}x{} grid (cell size {})",
            mesh.triangles().len(),
            raster.n_cols(),
            raster.n_rows(),
            raster.cell_size()
        );
        log::debug!("Raster bounds: {:?}", raster.bounds());

        let start = Instant::now();
        let mut z_range = ZRange::default();
        let mut warnings = Vec::new();

        for (index, triangle) in mesh.triangles().iter().enumerate() {
            let corners = mesh.corners(triangle);
            let planar = corners.map(|v| v.truncate());
            let [a, b, c] = planar;

            let area = doubled_area(a, b, c);
            if area == 0.0 || !area.is_finite() {
                log::warn!("Skipping degenerate triangle {}", index);
                warnings.push(RasterWarning::DegenerateTriangle { triangle: index });
                continue;
            }

            let Some(window) = LatticeWindow::for_triangle(&raster, &planar) else {
                continue;
            };

            for row in window.rows.clone() {
                for col in window.cols.clone() {
                    let p = raster.cell_position(row, col);
                    if !contains(p, a, b, c) {
                        continue;
                    }
                    let z = interpolate_elevation(p, corners[0], corners[1], corners[2]);
                    if let Some(i) = raster.offset(row, col) {
                        raster.store(i, z);
                        z_range.observe(z);
                    }
                }
            }
        }

        raster.merge_z_range(&z_range);

        log::info!(
            "Raster built in {:.3}s: {} cells covered, z range {:?}..{:?}",
            start.elapsed().as_secs_f64(),
            raster.covered_count(),
            raster.z_min(),
            raster.z_max()
        );
        if !warnings.is_empty() {
            log::warn!("{} triangles skipped", warnings.len());
        }

        Ok(Rasterization { raster, warnings })
    }
}

/// Lattice posts of a raster that fall inside a triangle's bounding box.
struct LatticeWindow {
    rows: std::ops::RangeInclusive<usize>,
    cols: std::ops::RangeInclusive<usize>,
}

impl LatticeWindow {
    /// `None` when no post lies inside the box, e.g. a sliver narrower than
    /// one cell.
    fn for_triangle(raster: &Raster, corners: &[DVec2; 3]) -> Option<Self> {
        let x_min = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min).floor() as i64;
        let x_max = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;
        let y_min = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min).floor() as i64;
        let y_max = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;

        let step = i64::from(raster.cell_size());
        let bounds = raster.bounds();

        let first_col = ceil_div(x_min - bounds.x_min, step).max(0);
        let last_col = (x_max - bounds.x_min).div_euclid(step).min(raster.n_cols() as i64 - 1);
        let first_row = ceil_div(bounds.y_max - y_max, step).max(0);
        let last_row = (bounds.y_max - y_min).div_euclid(step).min(raster.n_rows() as i64 - 1);

        if first_col > last_col || first_row > last_row {
            return None;
        }
        Some(Self {
            rows: first_row as usize..=last_row as usize,
            cols: first_col as usize..=last_col as usize,
        })
    }
}

fn ceil_div(n: i64, d: i64) -> i64 {
    -(-n).div_euclid(d)
}
