use std::collections::HashSet;

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::topology::{EdgeId, FaceId, TopologyStore, VertexId};

/// Removes edges, merging the two faces on either side of each into one.
///
/// A free edge is simply removed. Edges bordering a single face, or more than
/// two, are left alone. With `use_verts`, endpoints left with exactly two
/// edges are dissolved too and endpoints left with none are removed.
pub struct DissolveEdges {
    edges: Vec<EdgeId>,
    use_verts: bool,
}

impl DissolveEdges {
    /// Creates a new `DissolveEdges` operation.
    #[must_use]
    pub fn new(edges: Vec<EdgeId>) -> Self {
        Self {
            edges,
            use_verts: false,
        }
    }

    /// Also dissolves the endpoints that become redundant.
    #[must_use]
    pub fn use_verts(mut self, use_verts: bool) -> Self {
        self.use_verts = use_verts;
        self
    }

    /// Executes the dissolve, returning the faces that absorbed a neighbour.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the edges does not exist.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Vec<FaceId>> {
        for &edge in &self.edges {
            store.edge(edge)?;
        }

        let mut merged = Vec::new();
        let mut endpoints = Vec::new();
        for &edge in &self.edges {
            // An earlier merge may already have consumed this edge.
            let Ok(data) = store.edge(edge) else {
                continue;
            };
            endpoints.extend(data.vertices());
            match data.faces.len() {
                0 => {
                    store.remove_edge(edge)?;
                }
                2 => {
                    if let Some(face) = merge_faces_across(store, edge, None)? {
                        if !merged.contains(&face) {
                            merged.push(face);
                        }
                    }
                }
                n => debug!(faces = n, "edge is not between two faces, left in place"),
            }
        }

        if self.use_verts {
            let mut redundant = Vec::new();
            for v in endpoints {
                if !store.contains_vertex(v) || redundant.contains(&v) {
                    continue;
                }
                match store.linked_edges(v).len() {
                    0 => {
                        store.remove_vertex(v)?;
                    }
                    2 => redundant.push(v),
                    _ => {}
                }
            }
            DissolveVerts::new(redundant).execute(store)?;
        }

        merged.retain(|&f| store.contains_face(f));
        Ok(merged)
    }
}

/// Removes vertices that join exactly two edges, fusing those edges.
///
/// Faces through the vertex lose it from their loop; a face that would drop
/// below three vertices is removed. Vertices with any other edge count are
/// skipped.
pub struct DissolveVerts {
    vertices: Vec<VertexId>,
}

impl DissolveVerts {
    /// Creates a new `DissolveVerts` operation.
    #[must_use]
    pub fn new(vertices: Vec<VertexId>) -> Self {
        Self { vertices }
    }

    /// Executes the dissolve, returning how many vertices were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh around a vertex is inconsistent.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<usize> {
        let mut dissolved = 0;
        for &v in &self.vertices {
            if !store.contains_vertex(v) {
                continue;
            }
            let edges = store.linked_edges(v);
            let [first, second] = edges.as_slice() else {
                continue;
            };
            let n1 = store.edge(*first)?.other(v);
            let n2 = store.edge(*second)?.other(v);

            for face in store.linked_faces(v) {
                let remaining: Vec<VertexId> = store
                    .face(face)?
                    .vertices
                    .iter()
                    .copied()
                    .filter(|&x| x != v)
                    .collect();
                if remaining.len() < 3 {
                    store.remove_face(face)?;
                } else {
                    store.set_face_vertices(face, remaining)?;
                }
            }
            store.remove_vertex(v)?;
            if n1 != n2 {
                store.add_edge(n1, n2)?;
            }
            dissolved += 1;
        }
        Ok(dissolved)
    }
}

/// Merges a connected set of faces into one face along its outer boundary.
///
/// Interior edges of the region are dissolved one by one; the first face of
/// the set absorbs the others and keeps its tag.
pub struct DissolveFaces {
    faces: Vec<FaceId>,
}

impl DissolveFaces {
    /// Creates a new `DissolveFaces` operation.
    #[must_use]
    pub fn new(faces: Vec<FaceId>) -> Self {
        Self { faces }
    }

    /// Executes the dissolve, returning the surviving faces of the region.
    ///
    /// A connected region yields exactly one face.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the faces does not exist.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Vec<FaceId>> {
        let mut region: Vec<FaceId> = Vec::new();
        for &face in &self.faces {
            store.face(face)?;
            if !region.contains(&face) {
                region.push(face);
            }
        }

        loop {
            let members: HashSet<FaceId> = region.iter().copied().collect();
            let mut interior = None;
            'search: for &face in &region {
                for edge in store.face_edges(face)? {
                    let faces = &store.edge(edge)?.faces;
                    if faces.len() == 2
                        && faces[0] != faces[1]
                        && faces.iter().all(|f| members.contains(f))
                    {
                        interior = Some(edge);
                        break 'search;
                    }
                }
            }
            let Some(edge) = interior else {
                break;
            };
            if merge_faces_across(store, edge, region.first().copied())?.is_none() {
                break;
            }
            region.retain(|&f| store.contains_face(f));
        }
        Ok(region)
    }
}

/// Joins the two faces of `edge` into one, removing the edge.
///
/// The face listed first on the edge survives unless `prefer` names the
/// other one. Returns the surviving face, or `None` if the edge does not
/// separate two distinct faces.
pub(crate) fn merge_faces_across(
    store: &mut TopologyStore,
    edge: EdgeId,
    prefer: Option<FaceId>,
) -> Result<Option<FaceId>> {
    let data = store.edge(edge)?;
    let (a, b) = (data.start, data.end);
    let [first, second] = data.faces.as_slice() else {
        return Ok(None);
    };
    let (keep, absorb) = if prefer == Some(*second) {
        (*second, *first)
    } else {
        (*first, *second)
    };
    if keep == absorb {
        return Ok(None);
    }

    // Rotate the kept loop to run b .. a and the absorbed loop to run a .. b.
    let kept = store.face(keep)?;
    let (a, b) = if kept.has_directed_pair(a, b) { (a, b) } else { (b, a) };
    let kept_loop = rotate_to_start(&kept.vertices, b)
        .ok_or_else(|| TopologyError::InvalidTopology("edge missing from face loop".into()))?;

    let absorbed = store.face(absorb)?;
    let mut other = absorbed.vertices.clone();
    if absorbed.has_directed_pair(a, b) {
        other.reverse();
    }
    let other_loop = rotate_to_start(&other, a)
        .ok_or_else(|| TopologyError::InvalidTopology("edge missing from face loop".into()))?;

    let mut merged = kept_loop;
    merged.extend(other_loop.iter().skip(1).take(other_loop.len().saturating_sub(2)));
    let merged = remove_spurs(merged);

    let mut before: HashSet<EdgeId> = store.face_edges(keep)?.into_iter().collect();
    before.extend(store.face_edges(absorb)?);
    store.remove_face(absorb)?;
    let survivor = if merged.len() < 3 {
        store.remove_face(keep)?;
        None
    } else {
        store.set_face_vertices(keep, merged)?;
        Some(keep)
    };
    for stale in before {
        if store.edge(stale).is_ok_and(|e| e.faces.is_empty()) {
            store.remove_edge(stale)?;
        }
    }
    Ok(survivor)
}

fn rotate_to_start(verts: &[VertexId], start: VertexId) -> Option<Vec<VertexId>> {
    let i = verts.iter().position(|&v| v == start)?;
    let mut rotated = verts[i..].to_vec();
    rotated.extend_from_slice(&verts[..i]);
    Some(rotated)
}

/// Strips back-and-forth excursions (`x, v, x`) left where two merged faces
/// shared a chain of edges.
fn remove_spurs(mut verts: Vec<VertexId>) -> Vec<VertexId> {
    loop {
        let n = verts.len();
        if n < 3 {
            return verts;
        }
        let spur = (0..n).find(|&i| verts[(i + n - 1) % n] == verts[(i + 1) % n]);
        let Some(i) = spur else {
            verts.dedup();
            return verts;
        };
        // Drop the tip and one copy of the repeated neighbour.
        let next = (i + 1) % n;
        let (first, second) = if i < next { (i, next) } else { (next, i) };
        verts.remove(second);
        verts.remove(first);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::topology::FaceTag;

    /// Two unit squares side by side sharing the edge x = 1.
    fn two_squares(store: &mut TopologyStore) -> (Vec<VertexId>, FaceId, FaceId) {
        let v: Vec<_> = [
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (0.0, 1.0),
        ]
        .iter()
        .map(|&(x, y)| store.add_vertex(Point3::new(x, y, 0.0)))
        .collect();
        let left = store.add_face(vec![v[0], v[1], v[4], v[5]], FaceTag::Roof).unwrap();
        let right = store
            .add_face(vec![v[1], v[2], v[3], v[4]], FaceTag::RoofHangs)
            .unwrap();
        (v, left, right)
    }

    // ── DissolveEdges ──

    #[test]
    fn shared_edge_merges_faces() {
        let mut store = TopologyStore::new();
        let (v, left, right) = two_squares(&mut store);
        let shared = store.find_edge(v[1], v[4]).unwrap();
        let merged = DissolveEdges::new(vec![shared]).execute(&mut store).unwrap();
        assert_eq!(merged, vec![left]);
        assert!(!store.contains_face(right));
        assert_eq!(store.face(left).unwrap().tag, FaceTag::Roof);
        assert_eq!(store.face(left).unwrap().vertices.len(), 6);
        assert!(store.find_edge(v[1], v[4]).is_none());
        assert!((store.face_normal(left).unwrap().z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn use_verts_removes_straight_vertices() {
        let mut store = TopologyStore::new();
        let (v, left, _) = two_squares(&mut store);
        let shared = store.find_edge(v[1], v[4]).unwrap();
        DissolveEdges::new(vec![shared])
            .use_verts(true)
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.face(left).unwrap().vertices.len(), 4);
        assert_eq!(store.vertex_count(), 4);
        assert_eq!(store.edge_count(), 4);
    }

    #[test]
    fn free_edge_is_removed_and_missing_edge_errors() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(Point3::origin());
        let b = store.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let e = store.add_edge(a, b).unwrap();
        DissolveEdges::new(vec![e]).execute(&mut store).unwrap();
        assert_eq!(store.edge_count(), 0);
        assert!(DissolveEdges::new(vec![e]).execute(&mut store).is_err());
    }

    #[test]
    fn boundary_edge_is_left_alone() {
        let mut store = TopologyStore::new();
        let (v, left, _) = two_squares(&mut store);
        let border = store.find_edge(v[0], v[1]).unwrap();
        let merged = DissolveEdges::new(vec![border]).execute(&mut store).unwrap();
        assert!(merged.is_empty());
        assert!(store.contains_edge(border));
        assert!(store.contains_face(left));
    }

    // ── DissolveVerts ──

    #[test]
    fn two_edge_vertex_is_fused() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(Point3::origin());
        let m = store.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let b = store.add_vertex(Point3::new(2.0, 0.0, 0.0));
        store.add_edge(a, m).unwrap();
        store.add_edge(m, b).unwrap();
        assert_eq!(DissolveVerts::new(vec![m, a]).execute(&mut store).unwrap(), 1);
        assert!(store.find_edge(a, b).is_some());
        assert_eq!(store.vertex_count(), 2);
    }

    // ── DissolveFaces ──

    #[test]
    fn fan_of_triangles_becomes_one_face() {
        let mut store = TopologyStore::new();
        let c = store.add_vertex(Point3::new(0.5, 0.5, 0.0));
        let corners: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| store.add_vertex(Point3::new(x, y, 0.0)))
            .collect();
        let faces: Vec<_> = (0..4)
            .map(|i| {
                store
                    .add_face(vec![corners[i], corners[(i + 1) % 4], c], FaceTag::Roof)
                    .unwrap()
            })
            .collect();

        let region = DissolveFaces::new(faces).execute(&mut store).unwrap();
        assert_eq!(region.len(), 1);
        let face = store.face(region[0]).unwrap();
        assert_eq!(face.vertices.len(), 4);
        assert!(!face.contains(c));
        assert_eq!(store.edge_count(), 4);
        assert!((store.face_normal(region[0]).unwrap().z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn spurs_are_stripped() {
        let mut store = TopologyStore::new();
        let v: Vec<_> = (0..4)
            .map(|i| store.add_vertex(Point3::new(f64::from(i), 0.0, 0.0)))
            .collect();
        let cleaned = remove_spurs(vec![v[0], v[1], v[2], v[1], v[3]]);
        assert_eq!(cleaned, vec![v[0], v[1], v[3]]);
    }
}
