use std::collections::HashSet;

use crate::error::Result;
use crate::topology::{EdgeId, FaceId, TopologyStore, VertexId};

/// What a [`Delete`] removes besides the listed entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteContext {
    /// Faces, plus their edges and vertices that no longer support anything.
    Faces,
    /// Faces only; their boundary edges and vertices stay.
    FacesOnly,
    /// Edges and vertices, with every face using them.
    EdgesAndVerts,
}

/// Removes mesh entities according to a [`DeleteContext`].
pub struct Delete {
    context: DeleteContext,
    faces: Vec<FaceId>,
    edges: Vec<EdgeId>,
    vertices: Vec<VertexId>,
}

impl Delete {
    /// Deletes faces in the `Faces` or `FacesOnly` context.
    ///
    /// With `EdgesAndVerts`, the faces' edges and vertices go as well.
    #[must_use]
    pub fn faces(faces: Vec<FaceId>, context: DeleteContext) -> Self {
        Self {
            context,
            faces,
            edges: Vec::new(),
            vertices: Vec::new(),
        }
    }

    /// Deletes edges and vertices together with the faces using them.
    #[must_use]
    pub fn edges_and_verts(edges: Vec<EdgeId>, vertices: Vec<VertexId>) -> Self {
        Self {
            context: DeleteContext::EdgesAndVerts,
            faces: Vec::new(),
            edges,
            vertices,
        }
    }

    /// Executes the deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if a listed entity does not exist.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        for &f in &self.faces {
            store.face(f)?;
        }
        for &e in &self.edges {
            store.edge(e)?;
        }
        for &v in &self.vertices {
            store.vertex(v)?;
        }

        match self.context {
            DeleteContext::FacesOnly => {
                for &f in &self.faces {
                    if store.contains_face(f) {
                        store.remove_face(f)?;
                    }
                }
            }
            DeleteContext::Faces => {
                let mut edges = HashSet::new();
                let mut vertices = HashSet::new();
                for &f in &self.faces {
                    if !store.contains_face(f) {
                        continue;
                    }
                    edges.extend(store.face_edges(f)?);
                    vertices.extend(store.face(f)?.vertices.iter().copied());
                    store.remove_face(f)?;
                }
                for e in edges {
                    if store.edge(e).is_ok_and(|data| data.faces.is_empty()) {
                        store.remove_edge(e)?;
                    }
                }
                for v in vertices {
                    if store.linked_edges(v).is_empty() {
                        store.remove_vertex(v)?;
                    }
                }
            }
            DeleteContext::EdgesAndVerts => {
                let mut edges = self.edges.clone();
                let mut vertices = self.vertices.clone();
                for &f in &self.faces {
                    if store.contains_face(f) {
                        edges.extend(store.face_edges(f)?);
                        vertices.extend(store.face(f)?.vertices.iter().copied());
                    }
                }
                for e in edges {
                    if store.contains_edge(e) {
                        store.remove_edge(e)?;
                    }
                }
                for v in vertices {
                    if store.contains_vertex(v) {
                        store.remove_vertex(v)?;
                    }
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
    use crate::math::Point3;
    use crate::topology::FaceTag;

    /// Two triangles sharing the edge 1-2 plus a loose edge 3-4.
    fn fixture(store: &mut TopologyStore) -> (Vec<VertexId>, FaceId, FaceId) {
        let v: Vec<_> = [
            (0.0, 0.0),
            (1.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (3.0, 3.0),
        ]
        .iter()
        .map(|&(x, y)| store.add_vertex(Point3::new(x, y, 0.0)))
        .collect();
        let a = store.add_face(vec![v[0], v[1], v[2]], FaceTag::Roof).unwrap();
        let b = store.add_face(vec![v[1], v[3], v[2]], FaceTag::Roof).unwrap();
        store.add_edge(v[3], v[4]).unwrap();
        (v, a, b)
    }

    #[test]
    fn faces_only_keeps_wireframe() {
        let mut store = TopologyStore::new();
        let (_, a, _) = fixture(&mut store);
        Delete::faces(vec![a], DeleteContext::FacesOnly)
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.face_count(), 1);
        assert_eq!(store.edge_count(), 6);
        assert_eq!(store.vertex_count(), 5);
    }

    #[test]
    fn faces_context_removes_unsupported_geometry() {
        let mut store = TopologyStore::new();
        let (v, a, b) = fixture(&mut store);
        Delete::faces(vec![a], DeleteContext::Faces)
            .execute(&mut store)
            .unwrap();
        assert!(store.contains_face(b));
        assert!(!store.contains_vertex(v[0]));
        assert!(store.find_edge(v[1], v[2]).is_some());
        assert_eq!(store.edge_count(), 4);
    }

    #[test]
    fn edges_and_verts_cascade_to_faces() {
        let mut store = TopologyStore::new();
        let (v, _, b) = fixture(&mut store);
        let loose = store.find_edge(v[3], v[4]).unwrap();
        Delete::edges_and_verts(vec![loose], vec![v[0]])
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.face_count(), 1);
        assert!(store.contains_face(b));
        assert!(store.contains_vertex(v[4]));
        assert_eq!(store.edge_count(), 3);
    }

    #[test]
    fn missing_entity_is_an_error() {
        let mut store = TopologyStore::new();
        let (_, a, _) = fixture(&mut store);
        store.remove_face(a).unwrap();
        assert!(Delete::faces(vec![a], DeleteContext::Faces)
            .execute(&mut store)
            .is_err());
    }
}
