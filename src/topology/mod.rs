pub mod edge;
pub mod face;
pub mod vertex;

pub use edge::{EdgeData, EdgeId};
pub use face::{FaceData, FaceId, FaceTag};
pub use vertex::{VertexData, VertexId};

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::error::TopologyError;
use crate::math::polygon_3d::{center_median, newell_normal};
use crate::math::{Point3, Vector3};

/// Central arena that owns all mesh entities.
///
/// Entities reference each other via typed IDs (generational indices), so a
/// handle to a deleted entity is detected instead of silently aliasing a new
/// one. Every stage of roof construction receives the store explicitly.
#[derive(Debug, Default, Clone)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    faces: SlotMap<FaceId, FaceData>,
    edge_index: HashMap<(VertexId, VertexId), EdgeId>,
}

fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex at `point` and returns its ID.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        self.vertices.insert(VertexData::new(point))
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns a mutable reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn point(&self, id: VertexId) -> Result<Point3, TopologyError> {
        Ok(self.vertex(id)?.point)
    }

    /// Returns `true` if the vertex is alive.
    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    /// Iterates over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Edges incident to `vertex`.
    #[must_use]
    pub fn linked_edges(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, e)| e.contains(vertex))
            .map(|(id, _)| id)
            .collect()
    }

    /// Faces whose loop contains `vertex`.
    #[must_use]
    pub fn linked_faces(&self, vertex: VertexId) -> Vec<FaceId> {
        self.faces
            .iter()
            .filter(|(_, f)| f.contains(vertex))
            .map(|(id, _)| id)
            .collect()
    }

    /// Removes a vertex together with every edge and face using it.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<VertexData, TopologyError> {
        for face in self.linked_faces(id) {
            self.remove_face(face)?;
        }
        for edge in self.linked_edges(id) {
            self.remove_edge(edge)?;
        }
        self.vertices
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    // --- Edge operations ---

    /// Looks up the edge joining `a` and `b`, in either direction.
    #[must_use]
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_index.get(&edge_key(a, b)).copied()
    }

    /// Returns the edge joining `a` and `b`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is missing or `a == b`.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId, TopologyError> {
        if a == b {
            return Err(TopologyError::InvalidTopology(
                "edge endpoints must be distinct".into(),
            ));
        }
        self.vertex(a)?;
        self.vertex(b)?;
        if let Some(id) = self.find_edge(a, b) {
            return Ok(id);
        }
        let id = self.edges.insert(EdgeData::new(a, b));
        self.edge_index.insert(edge_key(a, b), id);
        Ok(id)
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Returns `true` if the edge is alive.
    #[must_use]
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    /// Iterates over all edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.edges.iter()
    }

    /// Number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Midpoint of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn edge_median(&self, id: EdgeId) -> Result<Point3, TopologyError> {
        let edge = self.edge(id)?;
        let a = self.point(edge.start)?;
        let b = self.point(edge.end)?;
        Ok(nalgebra::center(&a, &b))
    }

    /// Length of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn edge_length(&self, id: EdgeId) -> Result<f64, TopologyError> {
        let edge = self.edge(id)?;
        Ok((self.point(edge.end)? - self.point(edge.start)?).norm())
    }

    /// Removes an edge and every face running along it.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<EdgeData, TopologyError> {
        let faces = self.edge(id)?.faces.clone();
        for face in faces {
            self.remove_face(face)?;
        }
        let data = self
            .edges
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))?;
        self.edge_index.remove(&edge_key(data.start, data.end));
        Ok(data)
    }

    // --- Face operations ---

    /// Inserts a face bounded by `vertices`, creating missing edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop has fewer than 3 vertices, repeats a
    /// vertex consecutively, or references a missing vertex.
    pub fn add_face(
        &mut self,
        vertices: Vec<VertexId>,
        tag: FaceTag,
    ) -> Result<FaceId, TopologyError> {
        self.check_loop(&vertices)?;
        let id = self.faces.insert(FaceData::new(vertices, tag));
        self.register_face(id)?;
        Ok(id)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Returns `true` if the face is alive.
    #[must_use]
    pub fn contains_face(&self, id: FaceId) -> bool {
        self.faces.contains_key(id)
    }

    /// Iterates over all faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> {
        self.faces.iter()
    }

    /// Number of live faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Assigns a role tag to a face.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn set_face_tag(&mut self, id: FaceId, tag: FaceTag) -> Result<(), TopologyError> {
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))?
            .tag = tag;
        Ok(())
    }

    /// Replaces the boundary loop of a face, keeping its ID and tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is missing or the new loop is invalid.
    pub fn set_face_vertices(
        &mut self,
        id: FaceId,
        vertices: Vec<VertexId>,
    ) -> Result<(), TopologyError> {
        self.check_loop(&vertices)?;
        self.unregister_face(id)?;
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))?
            .vertices = vertices;
        self.register_face(id)
    }

    /// Removes a face. Its edges and vertices are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn remove_face(&mut self, id: FaceId) -> Result<FaceData, TopologyError> {
        self.unregister_face(id)?;
        self.faces
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Edges along the face loop, in loop order.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its edges is missing.
    pub fn face_edges(&self, id: FaceId) -> Result<Vec<EdgeId>, TopologyError> {
        self.face(id)?
            .loop_pairs()
            .map(|(a, b)| {
                self.find_edge(a, b)
                    .ok_or_else(|| TopologyError::EntityNotFound("face edge".into()))
            })
            .collect()
    }

    /// Positions of the face loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its vertices is missing.
    pub fn face_points(&self, id: FaceId) -> Result<Vec<Point3>, TopologyError> {
        self.face(id)?
            .vertices
            .iter()
            .map(|&v| self.point(v))
            .collect()
    }

    /// Unit normal of a face (Newell), or the zero vector for a degenerate loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its vertices is missing.
    pub fn face_normal(&self, id: FaceId) -> Result<Vector3, TopologyError> {
        Ok(newell_normal(&self.face_points(id)?).unwrap_or_else(Vector3::zeros))
    }

    /// Mean of the face's vertex positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its vertices is missing.
    pub fn face_center(&self, id: FaceId) -> Result<Point3, TopologyError> {
        Ok(center_median(&self.face_points(id)?))
    }

    /// Faces sharing an edge with `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its edges is missing.
    pub fn adjacent_faces(&self, id: FaceId) -> Result<Vec<FaceId>, TopologyError> {
        let mut result = Vec::new();
        for edge in self.face_edges(id)? {
            for &other in &self.edge(edge)?.faces {
                if other != id && !result.contains(&other) {
                    result.push(other);
                }
            }
        }
        Ok(result)
    }

    fn check_loop(&self, vertices: &[VertexId]) -> Result<(), TopologyError> {
        if vertices.len() < 3 {
            return Err(TopologyError::InvalidTopology(format!(
                "face loop needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        let n = vertices.len();
        for i in 0..n {
            self.vertex(vertices[i])?;
            if vertices[i] == vertices[(i + 1) % n] {
                return Err(TopologyError::InvalidTopology(
                    "face loop repeats a vertex consecutively".into(),
                ));
            }
        }
        Ok(())
    }

    fn register_face(&mut self, id: FaceId) -> Result<(), TopologyError> {
        let pairs: Vec<_> = self.face(id)?.loop_pairs().collect();
        for (a, b) in pairs {
            let edge = self.add_edge(a, b)?;
            if let Some(data) = self.edges.get_mut(edge) {
                data.faces.push(id);
            }
        }
        Ok(())
    }

    fn unregister_face(&mut self, id: FaceId) -> Result<(), TopologyError> {
        let pairs: Vec<_> = self.face(id)?.loop_pairs().collect();
        for (a, b) in pairs {
            if let Some(edge) = self.find_edge(a, b) {
                if let Some(data) = self.edges.get_mut(edge) {
                    data.faces.retain(|&f| f != id);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square(store: &mut TopologyStore) -> (Vec<VertexId>, FaceId) {
        let verts = vec![
            store.add_vertex(Point3::new(0.0, 0.0, 0.0)),
            store.add_vertex(Point3::new(1.0, 0.0, 0.0)),
            store.add_vertex(Point3::new(1.0, 1.0, 0.0)),
            store.add_vertex(Point3::new(0.0, 1.0, 0.0)),
        ];
        let face = store.add_face(verts.clone(), FaceTag::Roof).unwrap();
        (verts, face)
    }

    #[test]
    fn add_face_creates_loop_edges() {
        let mut store = TopologyStore::new();
        let (verts, face) = square(&mut store);
        assert_eq!(store.edge_count(), 4);
        let edges = store.face_edges(face).unwrap();
        assert_eq!(edges.len(), 4);
        for e in edges {
            assert_eq!(store.edge(e).unwrap().faces, vec![face]);
        }
        assert_eq!(store.linked_edges(verts[0]).len(), 2);
    }

    #[test]
    fn edges_are_unique_per_vertex_pair() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(Point3::origin());
        let b = store.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let e1 = store.add_edge(a, b).unwrap();
        let e2 = store.add_edge(b, a).unwrap();
        assert_eq!(e1, e2);
        assert_eq!(store.find_edge(b, a), Some(e1));
        assert!(store.add_edge(a, a).is_err());
    }

    #[test]
    fn remove_face_keeps_edges() {
        let mut store = TopologyStore::new();
        let (_, face) = square(&mut store);
        store.remove_face(face).unwrap();
        assert_eq!(store.face_count(), 0);
        assert_eq!(store.edge_count(), 4);
        assert!(store.edges().all(|(_, e)| e.faces.is_empty()));
    }

    #[test]
    fn remove_edge_kills_adjacent_faces() {
        let mut store = TopologyStore::new();
        let (verts, face) = square(&mut store);
        let e = store.find_edge(verts[0], verts[1]).unwrap();
        store.remove_edge(e).unwrap();
        assert!(!store.contains_face(face));
        assert_eq!(store.edge_count(), 3);
        assert!(store.find_edge(verts[0], verts[1]).is_none());
    }

    #[test]
    fn remove_vertex_cascades() {
        let mut store = TopologyStore::new();
        let (verts, _) = square(&mut store);
        store.remove_vertex(verts[0]).unwrap();
        assert_eq!(store.face_count(), 0);
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.vertex_count(), 3);
    }

    #[test]
    fn face_normal_follows_winding() {
        let mut store = TopologyStore::new();
        let (verts, face) = square(&mut store);
        assert!((store.face_normal(face).unwrap().z - 1.0).abs() < 1e-12);
        let reversed: Vec<_> = verts.into_iter().rev().collect();
        store.set_face_vertices(face, reversed).unwrap();
        assert!((store.face_normal(face).unwrap().z + 1.0).abs() < 1e-12);
        assert_eq!(store.edge_count(), 4);
    }

    #[test]
    fn invalid_loops_are_rejected() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(Point3::origin());
        let b = store.add_vertex(Point3::new(1.0, 0.0, 0.0));
        assert!(store.add_face(vec![a, b], FaceTag::Untagged).is_err());
        assert!(store.add_face(vec![a, b, b], FaceTag::Untagged).is_err());
    }

    #[test]
    fn stale_ids_are_detected() {
        let mut store = TopologyStore::new();
        let v = store.add_vertex(Point3::origin());
        store.remove_vertex(v).unwrap();
        let _ = store.add_vertex(Point3::origin());
        assert!(store.vertex(v).is_err());
    }
}
