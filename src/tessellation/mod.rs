//! Triangulation of mesh faces for export and rendering.

mod tessellate_face;
mod tessellate_roof;

pub use tessellate_face::TessellateFaces;
pub use tessellate_roof::TessellateRoof;

use crate::math::{Point2, Point3, Vector3};

/// A triangle mesh approximation of a set of faces.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// Planar coordinates of each vertex in its face's projection basis.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Total area of all triangles.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.indices
            .iter()
            .map(|&[a, b, c]| {
                let (a, b, c) = (
                    self.vertices[a as usize],
                    self.vertices[b as usize],
                    self.vertices[c as usize],
                );
                (b - a).cross(&(c - a)).norm() / 2.0
            })
            .sum()
    }

    /// Appends `other`, offsetting its indices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn append(&mut self, other: TriangleMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.normals.extend(other.normals);
        self.uvs.extend(other.uvs);
        self.indices.extend(
            other
                .indices
                .into_iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }
}
