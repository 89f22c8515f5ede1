use std::collections::{HashMap, HashSet};

use crate::error::{OperationError, Result};
use crate::math::Vector3;
use crate::topology::{EdgeId, FaceId, FaceTag, TopologyStore, VertexId};

/// Smallest cosine used when compensating the offset at creased vertices.
const MIN_EVEN_OFFSET_COS: f64 = 0.1;

/// Faces and vertices produced by [`InsetRegion`].
#[derive(Debug, Clone, Default)]
pub struct Inset {
    /// Quads joining the original region boundary to the displaced one.
    pub bridge_faces: Vec<FaceId>,
    /// Original vertex to displaced duplicate.
    pub vertices: HashMap<VertexId, VertexId>,
}

/// Pushes a region of faces along its normals, keeping its border attached.
///
/// This is an inset with zero thickness: the region does not shrink, it only
/// moves by `depth` along the averaged normal at each vertex (scaled so
/// creased regions keep an even distance). The region faces are re-pointed
/// onto the displaced vertices and keep their IDs; the original boundary
/// edges stay where they are and are joined to the displaced region by
/// bridge quads. Original vertices used only inside the region are removed.
pub struct InsetRegion {
    faces: Vec<FaceId>,
    depth: f64,
}

impl InsetRegion {
    /// Creates a new `InsetRegion` operation.
    #[must_use]
    pub fn new(faces: Vec<FaceId>, depth: f64) -> Self {
        Self { faces, depth }
    }

    /// Executes the inset.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for a non-finite depth or an
    /// empty region, or an error if a face is missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Inset> {
        if !self.depth.is_finite() {
            return Err(OperationError::InvalidInput("inset depth must be finite".into()).into());
        }
        let mut region: Vec<FaceId> = Vec::new();
        for &f in &self.faces {
            store.face(f)?;
            if !region.contains(&f) {
                region.push(f);
            }
        }
        if region.is_empty() {
            return Err(OperationError::InvalidInput("inset region is empty".into()).into());
        }
        let members: HashSet<FaceId> = region.iter().copied().collect();

        let mut order = Vec::new();
        let mut normals_at: HashMap<VertexId, Vec<Vector3>> = HashMap::new();
        let mut boundary = Vec::new();
        let mut old_edges: HashSet<EdgeId> = HashSet::new();
        for &f in &region {
            let normal = store.face_normal(f)?;
            let face = store.face(f)?;
            for &v in &face.vertices {
                if !order.contains(&v) {
                    order.push(v);
                }
                normals_at.entry(v).or_default().push(normal);
            }
            for (a, b) in face.loop_pairs() {
                if let Some(edge) = store.find_edge(a, b) {
                    old_edges.insert(edge);
                    let inside = store
                        .edge(edge)?
                        .faces
                        .iter()
                        .filter(|f| members.contains(f))
                        .count();
                    if inside == 1 {
                        boundary.push((a, b));
                    }
                }
            }
        }

        let mut vertices = HashMap::with_capacity(order.len());
        for &v in &order {
            let displacement = even_offset(&normals_at[&v]) * self.depth;
            let moved = store.point(v)? + displacement;
            vertices.insert(v, store.add_vertex(moved));
        }

        for &f in &region {
            let mapped: Vec<VertexId> = store.face(f)?.vertices.iter().map(|v| vertices[v]).collect();
            store.set_face_vertices(f, mapped)?;
        }

        let mut bridge_faces = Vec::with_capacity(boundary.len());
        for (a, b) in boundary {
            let quad = vec![a, b, vertices[&b], vertices[&a]];
            bridge_faces.push(store.add_face(quad, FaceTag::Untagged)?);
        }

        for edge in old_edges {
            if store.edge(edge).is_ok_and(|e| e.faces.is_empty()) {
                store.remove_edge(edge)?;
            }
        }
        for v in order {
            if store.linked_edges(v).is_empty() {
                store.remove_vertex(v)?;
            }
        }

        Ok(Inset {
            bridge_faces,
            vertices,
        })
    }
}

/// Averaged unit normal scaled by the inverse of its mean cosine to the
/// contributing face normals.
fn even_offset(normals: &[Vector3]) -> Vector3 {
    let sum: Vector3 = normals.iter().sum();
    let Some(average) = sum.try_normalize(f64::EPSILON) else {
        return Vector3::zeros();
    };
    #[allow(clippy::cast_precision_loss)]
    let mean_cos = normals.iter().map(|n| average.dot(n)).sum::<f64>() / normals.len() as f64;
    average / mean_cos.max(MIN_EVEN_OFFSET_COS)
}
