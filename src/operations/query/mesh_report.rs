use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::topology::{EdgeId, FaceId, TopologyStore};

/// Edge usage statistics of a mesh or of a face set within it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshSummary {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    /// Edges used by exactly one face.
    pub boundary_edges: usize,
    /// Edges used by more than two faces.
    pub non_manifold_edges: usize,
    /// Edges used by no face.
    pub wire_edges: usize,
}

impl MeshSummary {
    /// Every edge borders at most two faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edges == 0
    }

    /// Every edge borders exactly two faces.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.is_manifold() && self.boundary_edges == 0 && self.wire_edges == 0
    }
}

/// Counts how many faces use each edge.
#[derive(Debug, Default)]
pub struct MeshReport {
    faces: Option<Vec<FaceId>>,
}

impl MeshReport {
    /// Creates a report over the whole store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the report to `faces` and the edges they use.
    #[must_use]
    pub fn restricted_to(mut self, faces: Vec<FaceId>) -> Self {
        self.faces = Some(faces);
        self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if a listed face does not exist.
    pub fn execute(&self, store: &TopologyStore) -> Result<MeshSummary> {
        let Some(faces) = &self.faces else {
            let mut summary = MeshSummary {
                vertices: store.vertex_count(),
                edges: store.edge_count(),
                faces: store.face_count(),
                ..MeshSummary::default()
            };
            for (_, edge) in store.edges() {
                count_usage(&mut summary, edge.faces.len());
            }
            return Ok(summary);
        };

        let faces: HashSet<FaceId> = faces.iter().copied().collect();
        let mut usage: HashMap<EdgeId, usize> = HashMap::new();
        let mut vertices = HashSet::new();
        for &f in &faces {
            vertices.extend(store.face(f)?.vertices.iter().copied());
            for edge in store.face_edges(f)? {
                *usage.entry(edge).or_default() += 1;
            }
        }
        let mut summary = MeshSummary {
            vertices: vertices.len(),
            edges: usage.len(),
            faces: faces.len(),
            ..MeshSummary::default()
        };
        for count in usage.into_values() {
            count_usage(&mut summary, count);
        }
        Ok(summary)
    }
}

fn count_usage(summary: &mut MeshSummary, faces: usize) {
    match faces {
        0 => summary.wire_edges += 1,
        1 => summary.boundary_edges += 1,
        2 => {}
        _ => summary.non_manifold_edges += 1,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::MakeFace;
    use crate::operations::shaping::ExtrudeRegion;
    use crate::topology::FaceTag;

    #[test]
    fn open_box_has_a_boundary_rim() {
        let mut store = TopologyStore::new();
        let face = MakeFace::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .execute(&mut store)
        .unwrap();
        let extrusion = ExtrudeRegion::new(vec![face], Vector3::z())
            .execute(&mut store)
            .unwrap();

        let whole = MeshReport::new().execute(&store).unwrap();
        assert_eq!(whole.faces, 5);
        assert_eq!(whole.boundary_edges, 4);
        assert!(whole.is_manifold());
        assert!(!whole.is_closed());

        let sides = MeshReport::new()
            .restricted_to(extrusion.side_faces)
            .execute(&store)
            .unwrap();
        assert_eq!(sides.edges, 12);
        assert_eq!(sides.boundary_edges, 8);
    }

    #[test]
    fn three_faces_on_one_edge_are_non_manifold() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(Point3::origin());
        let b = store.add_vertex(Point3::new(1.0, 0.0, 0.0));
        for z in [1.0, -1.0] {
            let c = store.add_vertex(Point3::new(0.5, 0.0, z));
            store.add_face(vec![a, b, c], FaceTag::Untagged).unwrap();
        }
        let c = store.add_vertex(Point3::new(0.5, 1.0, 0.0));
        store.add_face(vec![a, b, c], FaceTag::Untagged).unwrap();
        let summary = MeshReport::new().execute(&store).unwrap();
        assert_eq!(summary.non_manifold_edges, 1);
        assert!(!summary.is_manifold());
    }
}
