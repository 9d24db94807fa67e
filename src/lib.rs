//! Triangular mesh to elevation raster conversion.
//!
//! - [`mesh`] - Mesh data structures and the .2dm loader
//! - [`raster`] - Elevation grid and the rasterization pass

pub mod mesh;
pub mod raster;

pub use mesh::{load_2dm, Mesh, Triangle, Vertex};
pub use raster::{Raster, RasterConfig, RasterWarning, Rasterization, Rasterizer};
