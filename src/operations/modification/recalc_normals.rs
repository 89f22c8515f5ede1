use std::collections::{HashSet, VecDeque};

use crate::error::Result;
use crate::math::polygon_3d::newell_vector;
use crate::math::{Point3, Vector3};
use crate::topology::{FaceId, TopologyStore};

/// Makes the winding of a face set consistent and points it outward.
///
/// Faces are grouped into edge-connected components. Within a component,
/// neighbours are flipped until every shared edge is traversed in opposite
/// directions; then the whole component is flipped if its area-weighted
/// normals point towards its centroid rather than away from it.
pub struct RecalcNormals {
    faces: Vec<FaceId>,
}

impl RecalcNormals {
    /// Creates a new `RecalcNormals` operation.
    #[must_use]
    pub fn new(faces: Vec<FaceId>) -> Self {
        Self { faces }
    }

    /// Executes the operation, returning how many faces were flipped.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the faces does not exist.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<usize> {
        let members: HashSet<FaceId> = self.faces.iter().copied().collect();
        for &f in &members {
            store.face(f)?;
        }

        let mut visited = HashSet::new();
        let mut flipped = 0;
        for &seed in &self.faces {
            if !visited.insert(seed) {
                continue;
            }
            let mut component = vec![seed];
            let mut queue = VecDeque::from([seed]);
            while let Some(face) = queue.pop_front() {
                let pairs: Vec<_> = store.face(face)?.loop_pairs().collect();
                for (a, b) in pairs {
                    let Some(edge) = store.find_edge(a, b) else {
                        continue;
                    };
                    let neighbours = store.edge(edge)?.faces.clone();
                    for other in neighbours {
                        if !members.contains(&other) || !visited.insert(other) {
                            continue;
                        }
                        if store.face(other)?.has_directed_pair(a, b) {
                            flip(store, other)?;
                            flipped += 1;
                        }
                        component.push(other);
                        queue.push_back(other);
                    }
                }
            }

            if points_inward(store, &component)? {
                for &f in &component {
                    flip(store, f)?;
                }
                flipped += component.len();
            }
        }
        Ok(flipped)
    }
}

fn flip(store: &mut TopologyStore, face: FaceId) -> Result<()> {
    let mut verts = store.face(face)?.vertices.clone();
    verts.reverse();
    store.set_face_vertices(face, verts)?;
    Ok(())
}

fn points_inward(store: &TopologyStore, component: &[FaceId]) -> Result<bool> {
    let mut centers = Vec::with_capacity(component.len());
    let mut sum = Vector3::zeros();
    for &f in component {
        let center = store.face_center(f)?;
        sum += center.coords;
        centers.push(center);
    }
    #[allow(clippy::cast_precision_loss)]
    let centroid = Point3::from(sum / component.len() as f64);

    let mut outwardness = 0.0;
    for (&f, center) in component.iter().zip(&centers) {
        let weighted = newell_vector(&store.face_points(f)?);
        outwardness += weighted.dot(&(center - centroid));
    }
    Ok(outwardness < 0.0)
}
