use std::collections::HashSet;
use std::f64::consts::PI;

use tracing::debug;

use crate::error::{Result, SkeletonError};
use crate::math::polygon_2d::{max_lexicographic_index, signed_area_2d};
use crate::math::polygon_3d::center_median;
use crate::math::{xy, Point2, Point3, ANGULAR_TOLERANCE};
use crate::operations::modification::{DissolveEdges, DissolveVerts};
use crate::topology::{EdgeId, FaceId, TopologyStore, VertexId};

/// A footprint face ready for skeletonization.
#[derive(Debug, Clone)]
pub struct Footprint {
    /// The footprint face. It still exists; the builder deletes it.
    pub face: FaceId,
    /// Loop vertices as a counter-clockwise ring, starting at the
    /// lexicographically largest `(x, y)` vertex.
    pub ring: Vec<VertexId>,
    /// Boundary (eave) edges as directed pairs of the counter-clockwise ring.
    pub boundary: Vec<(VertexId, VertexId)>,
    /// Mean of the original loop positions, taken before any cleanup.
    pub median: Point3,
}

impl Footprint {
    /// 2-D positions of the counter-clockwise ring.
    ///
    /// # Errors
    ///
    /// Returns an error if a ring vertex no longer exists.
    pub fn points(&self, store: &TopologyStore) -> Result<Vec<Point2>> {
        self.ring
            .iter()
            .map(|&v| Ok(xy(&store.point(v)?)))
            .collect()
    }
}

/// Cleans up a footprint face and captures what the skeleton stage needs.
///
/// Vertices where the two boundary edges continue straight on are removed,
/// together with any extra edges hanging off them (for instance the vertical
/// edge of a slab side). The boundary edges of the face itself are kept.
pub struct PrepareFootprint {
    face: FaceId,
}

impl PrepareFootprint {
    /// Creates a new `PrepareFootprint` operation.
    #[must_use]
    pub fn new(face: FaceId) -> Self {
        Self { face }
    }

    /// Executes the preparation.
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError::InvalidGeometry`] if fewer than three corners
    /// remain after removing straight vertices, or an error if the face is
    /// missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Footprint> {
        let loop_verts = store.face(self.face)?.vertices.clone();
        let points = store.face_points(self.face)?;
        let median = center_median(&points);

        let n = loop_verts.len();
        let straight: Vec<VertexId> = (0..n)
            .filter(|&i| {
                let prev = points[(i + n - 1) % n] - points[i];
                let next = points[(i + 1) % n] - points[i];
                (prev.angle(&next) - PI).abs() < ANGULAR_TOLERANCE
            })
            .map(|i| loop_verts[i])
            .collect();

        if n - straight.len() < 3 {
            return Err(SkeletonError::InvalidGeometry {
                points: n,
                reason: format!("only {} corners are not straight", n - straight.len()),
            }
            .into());
        }

        if !straight.is_empty() {
            debug!(count = straight.len(), "dissolving straight footprint vertices");
            let face_edges: HashSet<EdgeId> = store.face_edges(self.face)?.into_iter().collect();
            let mut lone = Vec::new();
            for &v in &straight {
                for e in store.linked_edges(v) {
                    if !face_edges.contains(&e) && !lone.contains(&e) {
                        lone.push(e);
                    }
                }
            }
            DissolveEdges::new(lone).use_verts(true).execute(store)?;
            DissolveVerts::new(straight).execute(store)?;
        }

        let loop_verts = store.face(self.face)?.vertices.clone();
        let flat: Vec<Point2> = store
            .face_points(self.face)?
            .iter()
            .map(xy)
            .collect();
        let start = max_lexicographic_index(&flat).unwrap_or(0);
        let n = loop_verts.len();
        let ordered: Vec<VertexId> = (0..n).map(|k| loop_verts[(start + n - k) % n]).collect();

        let ordered_points: Vec<Point2> = (0..n).map(|k| flat[(start + n - k) % n]).collect();
        let mut ring = ordered;
        if signed_area_2d(&ordered_points) < 0.0 {
            ring[1..].reverse();
        }
        let boundary = (0..n).map(|i| (ring[i], ring[(i + 1) % n])).collect();

        Ok(Footprint {
            face: self.face,
            ring,
            boundary,
            median,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::operations::creation::MakeFace;
    use crate::topology::FaceTag;

    fn face(store: &mut TopologyStore, pts: &[(f64, f64)]) -> FaceId {
        MakeFace::new(pts.iter().map(|&(x, y)| Point3::new(x, y, 1.0)).collect())
            .execute(store)
            .unwrap()
    }

    #[test]
    fn ring_starts_at_max_corner() {
        let mut store = TopologyStore::new();
        let f = face(&mut store, &[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]);
        let loop_verts = store.face(f).unwrap().vertices.clone();
        let fp = PrepareFootprint::new(f).execute(&mut store).unwrap();

        assert_eq!(fp.ring, vec![loop_verts[2], loop_verts[3], loop_verts[0], loop_verts[1]]);
        assert!(signed_area_2d(&fp.points(&store).unwrap()) > 0.0);
        assert_eq!(fp.boundary.len(), 4);
        assert!(store.face(f).unwrap().has_directed_pair(fp.boundary[0].0, fp.boundary[0].1));
        assert_relative_eq!(fp.median.x, 1.0);
        assert_relative_eq!(fp.median.z, 1.0);
    }

    #[test]
    fn clockwise_face_yields_counter_clockwise_ring() {
        let mut store = TopologyStore::new();
        let f = face(&mut store, &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        let fp = PrepareFootprint::new(f).execute(&mut store).unwrap();
        assert!(signed_area_2d(&fp.points(&store).unwrap()) > 0.0);
        let start = store.point(fp.ring[0]).unwrap();
        assert_relative_eq!(start.x, 1.0);
        assert_relative_eq!(start.y, 1.0);
    }

    #[test]
    fn straight_vertex_is_dissolved() {
        let mut store = TopologyStore::new();
        let f = face(
            &mut store,
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
        );
        let fp = PrepareFootprint::new(f).execute(&mut store).unwrap();
        assert_eq!(fp.ring.len(), 4);
        assert_eq!(store.face(f).unwrap().vertices.len(), 4);
        assert_eq!(store.vertex_count(), 4);
        assert_eq!(store.edge_count(), 4);
        // The median still reflects the loop as it was handed in.
        assert_relative_eq!(fp.median.x, 1.0);
        assert_relative_eq!(fp.median.y, 0.8);
    }

    #[test]
    fn hanging_edge_on_straight_vertex_goes_too() {
        let mut store = TopologyStore::new();
        let f = face(
            &mut store,
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
        );
        let mid = store.face(f).unwrap().vertices[1];
        let below = store.add_vertex(Point3::new(1.0, 0.0, 0.0));
        store.add_edge(mid, below).unwrap();

        PrepareFootprint::new(f).execute(&mut store).unwrap();
        assert!(!store.contains_vertex(mid));
        assert!(!store.contains_vertex(below));
        assert_eq!(store.face(f).unwrap().vertices.len(), 4);
        assert_eq!(store.face(f).unwrap().tag, FaceTag::Untagged);
    }

    #[test]
    fn collinear_footprint_is_invalid() {
        let mut store = TopologyStore::new();
        let f = face(&mut store, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert!(PrepareFootprint::new(f).execute(&mut store).is_err());
    }
}
