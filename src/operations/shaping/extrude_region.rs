use std::collections::{HashMap, HashSet};

use crate::error::{OperationError, Result};
use crate::math::Vector3;
use crate::topology::{FaceId, FaceTag, TopologyStore, VertexId};

/// Faces and vertices produced by [`ExtrudeRegion`].
#[derive(Debug, Clone, Default)]
pub struct Extrusion {
    /// The translated region faces.
    pub top_faces: Vec<FaceId>,
    /// Quads connecting the region boundary to its translated copy.
    pub side_faces: Vec<FaceId>,
    /// Original vertex to translated duplicate.
    pub vertices: HashMap<VertexId, VertexId>,
}

/// Extrudes a region of faces as one piece.
///
/// Every vertex of the region is duplicated and moved by `offset`. By default
/// the region faces are moved onto the duplicates, leaving the original
/// boundary open; with [`keep_original`](Self::keep_original) the region
/// stays in place and translated copies are added instead. Side quads run
/// along the region boundary and wind consistently with the top faces.
pub struct ExtrudeRegion {
    faces: Vec<FaceId>,
    offset: Vector3,
    keep_original: bool,
}

impl ExtrudeRegion {
    /// Creates a new `ExtrudeRegion` operation.
    #[must_use]
    pub fn new(faces: Vec<FaceId>, offset: Vector3) -> Self {
        Self {
            faces,
            offset,
            keep_original: false,
        }
    }

    /// Keeps the original faces and extrudes copies of them.
    #[must_use]
    pub fn keep_original(mut self, keep: bool) -> Self {
        self.keep_original = keep;
        self
    }

    /// Executes the extrusion.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the region is empty or the
    /// offset is not finite, or an error if a face is missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Extrusion> {
        if !self.offset.iter().all(|c| c.is_finite()) {
            return Err(OperationError::InvalidInput("extrude offset must be finite".into()).into());
        }
        let mut region: Vec<FaceId> = Vec::new();
        for &f in &self.faces {
            store.face(f)?;
            if !region.contains(&f) {
                region.push(f);
            }
        }
        if region.is_empty() {
            return Err(OperationError::InvalidInput("extrude region is empty".into()).into());
        }
        let members: HashSet<FaceId> = region.iter().copied().collect();

        // Directed boundary pairs, as traversed by their region face.
        let mut boundary = Vec::new();
        let mut order = Vec::new();
        for &f in &region {
            let face = store.face(f)?;
            for &v in &face.vertices {
                if !order.contains(&v) {
                    order.push(v);
                }
            }
            for (a, b) in face.loop_pairs() {
                let edge = store.find_edge(a, b).map(|e| store.edge(e)).transpose()?;
                let inside = edge.map_or(0, |e| e.faces.iter().filter(|f| members.contains(f)).count());
                if inside == 1 {
                    boundary.push((a, b));
                }
            }
        }

        let mut vertices = HashMap::with_capacity(order.len());
        for v in order {
            let moved = store.point(v)? + self.offset;
            vertices.insert(v, store.add_vertex(moved));
        }

        let mut top_faces = Vec::with_capacity(region.len());
        for &f in &region {
            let face = store.face(f)?;
            let tag = face.tag;
            let mapped: Vec<VertexId> = face.vertices.iter().map(|v| vertices[v]).collect();
            if self.keep_original {
                top_faces.push(store.add_face(mapped, tag)?);
            } else {
                store.set_face_vertices(f, mapped)?;
                top_faces.push(f);
            }
        }

        let mut side_faces = Vec::with_capacity(boundary.len());
        for (a, b) in boundary {
            let quad = vec![a, b, vertices[&b], vertices[&a]];
            side_faces.push(store.add_face(quad, FaceTag::Untagged)?);
        }

        Ok(Extrusion {
            top_faces,
            side_faces,
            vertices,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeFace;

    fn unit_square(store: &mut TopologyStore) -> FaceId {
        MakeFace::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .with_tag(FaceTag::Roof)
        .execute(store)
        .unwrap()
    }

    #[test]
    fn moving_extrusion_reuses_face_and_opens_bottom() {
        let mut store = TopologyStore::new();
        let face = unit_square(&mut store);
        let result = ExtrudeRegion::new(vec![face], Vector3::new(0.0, 0.0, 2.0))
            .execute(&mut store)
            .unwrap();
        assert_eq!(result.top_faces, vec![face]);
        assert_eq!(result.side_faces.len(), 4);
        assert_eq!(store.face_count(), 5);
        for p in store.face_points(face).unwrap() {
            assert_relative_eq!(p.z, 2.0);
        }
        for &side in &result.side_faces {
            let n = store.face_normal(side).unwrap();
            let c = store.face_center(side).unwrap();
            assert_relative_eq!(n.z, 0.0);
            assert!(n.dot(&(c - Point3::new(0.5, 0.5, 1.0))) > 0.0);
            assert_eq!(store.face(side).unwrap().tag, FaceTag::Untagged);
        }
    }

    #[test]
    fn kept_original_gets_a_tagged_copy() {
        let mut store = TopologyStore::new();
        let face = unit_square(&mut store);
        let result = ExtrudeRegion::new(vec![face], Vector3::new(0.0, 0.0, 0.5))
            .keep_original(true)
            .execute(&mut store)
            .unwrap();
        assert!(store.contains_face(face));
        assert_ne!(result.top_faces[0], face);
        assert_eq!(store.face(result.top_faces[0]).unwrap().tag, FaceTag::Roof);
        assert_eq!(store.face_count(), 6);
        // Top edges border the copy and one side quad each.
        for e in store.face_edges(result.top_faces[0]).unwrap() {
            assert_eq!(store.edge(e).unwrap().faces.len(), 2);
        }
    }

    #[test]
    fn shared_edges_stay_inside_region() {
        let mut store = TopologyStore::new();
        let v: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| store.add_vertex(Point3::new(x, y, 0.0)))
            .collect();
        let left = store.add_face(vec![v[0], v[1], v[4], v[5]], FaceTag::Roof).unwrap();
        let right = store.add_face(vec![v[1], v[2], v[3], v[4]], FaceTag::Roof).unwrap();
        let result = ExtrudeRegion::new(vec![left, right], Vector3::new(0.0, 0.0, 1.0))
            .execute(&mut store)
            .unwrap();
        assert_eq!(result.side_faces.len(), 6);
        assert_eq!(result.vertices.len(), 6);
    }

    #[test]
    fn empty_region_is_rejected() {
        let mut store = TopologyStore::new();
        assert!(ExtrudeRegion::new(vec![], Vector3::z()).execute(&mut store).is_err());
    }
}
