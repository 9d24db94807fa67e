//! Triangular surface mesh data structures and file loading.
//!
//! This module provides:
//! - [`Mesh`] - Vertices, triangles and cached planar bounds
//! - [`load_2dm`] - Parser for .2dm mesh files

pub mod loader;

pub use loader::{load_2dm, parse_2dm_content, LoadError};

use glam::DVec3;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum MeshError {
    #[error("Triangle {triangle} references vertex index {index}, mesh has {vertex_count} vertices")]
    VertexIndexOutOfRange {
        triangle: usize,
        index: usize,
        vertex_count: usize,
    },
}

/// A mesh node. `position.z` is the elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Identifier as given by the source file
    pub id: u32,
    pub position: DVec3,
}

impl Vertex {
    pub fn new(id: u32, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            position: DVec3::new(x, y, z),
        }
    }
}

/// Three indices into [`Mesh::vertices`]. Winding is arbitrary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [usize; 3],
}

impl Triangle {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }
}

/// Axis-aligned extent of the mesh in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PlanarBounds {
    fn from_positions<'a>(positions: impl Iterator<Item = &'a DVec3>) -> Option<Self> {
        positions.fold(None, |bounds, p| {
            Some(match bounds {
                None => Self {
                    x_min: p.x,
                    x_max: p.x,
                    y_min: p.y,
                    y_max: p.y,
                },
                Some(b) => Self {
                    x_min: b.x_min.min(p.x),
                    x_max: b.x_max.max(p.x),
                    y_min: b.y_min.min(p.y),
                    y_max: b.y_max.max(p.y),
                },
            })
        })
    }
}

/// Unstructured triangular surface mesh.
///
/// The planar bounding box is computed once at construction. A mesh without
/// vertices has no bounds.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
    bounds: Option<PlanarBounds>,
}

impl Mesh {
    /// Create a mesh, checking that every triangle index points at a vertex.
    ///
    /// # Example
    ///
    /// ```
    /// use meshraster::mesh::{Mesh, Triangle, Vertex};
    ///
    /// let vertices = vec![
    ///     Vertex::new(1, 0.0, 0.0, 10.0),
    ///     Vertex::new(2, 4.0, 0.0, 10.0),
    ///     Vertex::new(3, 0.0, 4.0, 20.0),
    /// ];
    /// let mesh = Mesh::new(vertices, vec![Triangle::new(0, 1, 2)]).unwrap();
    /// assert_eq!(mesh.bounds().unwrap().x_max, 4.0);
    /// ```
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<Triangle>) -> Result<Self, MeshError> {
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.vertices.iter().find(|&&i| i >= vertices.len()) {
                return Err(MeshError::VertexIndexOutOfRange {
                    triangle,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }

        let bounds = PlanarBounds::from_positions(vertices.iter().map(|v| &v.position));
        Ok(Self {
            vertices,
            triangles,
            bounds,
        })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn bounds(&self) -> Option<PlanarBounds> {
        self.bounds
    }

    /// Vertex positions of a triangle, in the triangle's own order.
    pub fn corners(&self, triangle: &Triangle) -> [DVec3; 3] {
        triangle.vertices.map(|i| self.vertices[i].position)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.triangles.is_empty()
    }
}
