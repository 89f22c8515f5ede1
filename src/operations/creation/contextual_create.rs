use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::Result;
use crate::topology::{EdgeId, FaceId, FaceTag, TopologyStore, VertexId};

/// Builds a single face from an unordered set of edges.
///
/// The edges are chained into one loop. A closed chain becomes the face
/// boundary as is; an open chain is closed with an edge between its two
/// ends. Sets that branch (a vertex with more than two chain edges) or fall
/// apart into several pieces produce no face. The loop may be non-convex and
/// need not be planar.
pub struct ContextualCreate {
    edges: Vec<EdgeId>,
    orientation: Option<(VertexId, VertexId)>,
    tag: FaceTag,
}

impl ContextualCreate {
    /// Creates a new `ContextualCreate` operation.
    #[must_use]
    pub fn new(edges: Vec<EdgeId>) -> Self {
        Self {
            edges,
            orientation: None,
            tag: FaceTag::Untagged,
        }
    }

    /// Requests that the loop runs from `from` directly to `to`.
    ///
    /// Ignored when the two vertices are not consecutive in the loop.
    #[must_use]
    pub fn oriented(mut self, from: VertexId, to: VertexId) -> Self {
        self.orientation = Some((from, to));
        self
    }

    /// Sets the role tag of the created face.
    #[must_use]
    pub fn with_tag(mut self, tag: FaceTag) -> Self {
        self.tag = tag;
        self
    }

    /// Executes the operation.
    ///
    /// Returns `Ok(None)` when the edge set does not describe a single loop
    /// or chain. If a face with the same boundary already exists it is
    /// returned instead of creating a duplicate.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing from the store.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Option<FaceId>> {
        let mut seen = HashSet::new();
        let mut order: Vec<VertexId> = Vec::new();
        let mut adjacency: HashMap<VertexId, Vec<VertexId>> = HashMap::new();

        for &edge in &self.edges {
            if !seen.insert(edge) {
                continue;
            }
            let data = store.edge(edge)?;
            for (v, other) in [(data.start, data.end), (data.end, data.start)] {
                let neighbours = adjacency.entry(v).or_insert_with(|| {
                    order.push(v);
                    Vec::new()
                });
                neighbours.push(other);
            }
        }

        if order.is_empty() {
            return Ok(None);
        }
        if adjacency.values().any(|n| n.len() > 2) {
            debug!(edges = seen.len(), "edge set branches, no face created");
            return Ok(None);
        }

        let ends: Vec<VertexId> = order
            .iter()
            .copied()
            .filter(|v| adjacency[v].len() == 1)
            .collect();
        let start = match ends.as_slice() {
            [] => order[0],
            [first, _] => *first,
            _ => return Ok(None),
        };

        let Some(mut walk) = walk_chain(&adjacency, start) else {
            return Ok(None);
        };
        if walk.len() != order.len() || walk.len() < 3 {
            debug!(
                visited = walk.len(),
                total = order.len(),
                "edge set is not a single chain, no face created"
            );
            return Ok(None);
        }
        if !ends.is_empty() {
            debug!(vertices = walk.len(), "closing open edge chain");
        }

        if let Some((from, to)) = self.orientation {
            let n = walk.len();
            let backwards = (0..n).any(|i| walk[i] == to && walk[(i + 1) % n] == from);
            if backwards {
                walk.reverse();
            }
        }

        if let Some(existing) = find_existing_face(store, &walk) {
            return Ok(Some(existing));
        }

        Ok(Some(store.add_face(walk, self.tag)?))
    }
}

/// Follows the chain from `start` until it closes or runs out.
///
/// Returns `None` if a vertex is revisited before the chain closes.
fn walk_chain(adjacency: &HashMap<VertexId, Vec<VertexId>>, start: VertexId) -> Option<Vec<VertexId>> {
    let mut walk = vec![start];
    let mut prev: Option<VertexId> = None;
    let mut current = start;
    loop {
        let next = adjacency
            .get(&current)?
            .iter()
            .copied()
            .find(|&n| Some(n) != prev);
        match next {
            None => return Some(walk),
            Some(n) if n == start => return Some(walk),
            Some(n) => {
                if walk.contains(&n) {
                    return None;
                }
                walk.push(n);
                prev = Some(current);
                current = n;
            }
        }
    }
}

fn find_existing_face(store: &TopologyStore, walk: &[VertexId]) -> Option<FaceId> {
    let edge = store.find_edge(walk[0], walk[1])?;
    let wanted: HashSet<VertexId> = walk.iter().copied().collect();
    store.edge(edge).ok()?.faces.iter().copied().find(|&f| {
        store.face(f).is_ok_and(|face| {
            face.vertices.len() == walk.len()
                && face.vertices.iter().all(|v| wanted.contains(v))
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn ring(store: &mut TopologyStore, points: &[(f64, f64, f64)]) -> Vec<VertexId> {
        points
            .iter()
            .map(|&(x, y, z)| store.add_vertex(Point3::new(x, y, z)))
            .collect()
    }

    fn loop_edges(store: &mut TopologyStore, verts: &[VertexId]) -> Vec<EdgeId> {
        let n = verts.len();
        (0..n)
            .map(|i| store.add_edge(verts[i], verts[(i + 1) % n]).unwrap())
            .collect()
    }

    #[test]
    fn shuffled_closed_loop_becomes_face() {
        let mut store = TopologyStore::new();
        let v = ring(
            &mut store,
            &[(0.0, 0.0, 0.0), (2.0, 0.0, 0.0), (2.0, 2.0, 1.0), (0.0, 2.0, 1.0)],
        );
        let mut edges = loop_edges(&mut store, &v);
        edges.swap(0, 2);
        let face = ContextualCreate::new(edges)
            .oriented(v[0], v[1])
            .with_tag(FaceTag::Roof)
            .execute(&mut store)
            .unwrap()
            .unwrap();
        let data = store.face(face).unwrap();
        assert_eq!(data.tag, FaceTag::Roof);
        assert_eq!(data.vertices.len(), 4);
        assert!(data.has_directed_pair(v[0], v[1]));
    }

    #[test]
    fn orientation_reverses_loop() {
        let mut store = TopologyStore::new();
        let v = ring(&mut store, &[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]);
        let edges = loop_edges(&mut store, &v);
        let face = ContextualCreate::new(edges)
            .oriented(v[1], v[0])
            .execute(&mut store)
            .unwrap()
            .unwrap();
        assert!(store.face(face).unwrap().has_directed_pair(v[1], v[0]));
        assert!(store.face_normal(face).unwrap().z < 0.0);
    }

    #[test]
    fn open_chain_is_closed() {
        let mut store = TopologyStore::new();
        let v = ring(&mut store, &[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0)]);
        let edges = vec![
            store.add_edge(v[0], v[1]).unwrap(),
            store.add_edge(v[1], v[2]).unwrap(),
        ];
        let face = ContextualCreate::new(edges).execute(&mut store).unwrap();
        assert!(face.is_some());
        assert!(store.find_edge(v[2], v[0]).is_some());
    }

    #[test]
    fn branching_set_creates_nothing() {
        let mut store = TopologyStore::new();
        let v = ring(
            &mut store,
            &[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (2.0, 0.0, 0.0)],
        );
        let edges = vec![
            store.add_edge(v[0], v[1]).unwrap(),
            store.add_edge(v[1], v[2]).unwrap(),
            store.add_edge(v[1], v[3]).unwrap(),
        ];
        assert!(ContextualCreate::new(edges).execute(&mut store).unwrap().is_none());
        assert_eq!(store.face_count(), 0);
    }

    #[test]
    fn disconnected_set_creates_nothing() {
        let mut store = TopologyStore::new();
        let a = ring(&mut store, &[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]);
        let b = ring(&mut store, &[(5.0, 0.0, 0.0), (6.0, 0.0, 0.0), (5.0, 1.0, 0.0)]);
        let mut edges = loop_edges(&mut store, &a);
        edges.extend(loop_edges(&mut store, &b));
        assert!(ContextualCreate::new(edges).execute(&mut store).unwrap().is_none());
    }

    #[test]
    fn existing_face_is_reused() {
        let mut store = TopologyStore::new();
        let v = ring(&mut store, &[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]);
        let edges = loop_edges(&mut store, &v);
        let first = ContextualCreate::new(edges.clone()).execute(&mut store).unwrap();
        let second = ContextualCreate::new(edges).execute(&mut store).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.face_count(), 1);
    }
}
