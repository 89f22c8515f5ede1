use std::collections::HashMap;

use crate::error::{OperationError, Result};
use crate::topology::{TopologyStore, VertexId};

/// Record of which vertices were merged into which.
#[derive(Debug, Clone, Default)]
pub struct WeldMap {
    targets: HashMap<VertexId, VertexId>,
}

impl WeldMap {
    /// Returns the vertex that `vertex` ended up as.
    ///
    /// Vertices that were not merged map to themselves.
    #[must_use]
    pub fn resolve(&self, vertex: VertexId) -> VertexId {
        let mut current = vertex;
        while let Some(&next) = self.targets.get(&current) {
            current = next;
        }
        current
    }

    /// Returns `true` if `vertex` was merged away.
    #[must_use]
    pub fn is_merged(&self, vertex: VertexId) -> bool {
        self.targets.contains_key(&vertex)
    }

    /// Number of vertices merged away.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if nothing was merged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Merges vertices closer than a distance.
///
/// Candidates are visited in the given order; the earlier vertex of a close
/// pair survives and the later one is merged into it. Edges and face loops
/// are rewritten onto the survivor; edges and faces that collapse are
/// dropped. Running the operation twice changes nothing the second time.
pub struct RemoveDoubles {
    vertices: Vec<VertexId>,
    distance: f64,
}

impl RemoveDoubles {
    /// Creates a new `RemoveDoubles` operation over `vertices`.
    #[must_use]
    pub fn new(vertices: Vec<VertexId>, distance: f64) -> Self {
        Self { vertices, distance }
    }

    /// Executes the weld.
    ///
    /// Vertices that no longer exist are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for a negative or non-finite
    /// distance.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<WeldMap> {
        if !(self.distance.is_finite() && self.distance >= 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "weld distance {} must be finite and non-negative",
                self.distance
            ))
            .into());
        }

        let mut candidates: Vec<VertexId> = Vec::with_capacity(self.vertices.len());
        for &v in &self.vertices {
            if store.contains_vertex(v) && !candidates.contains(&v) {
                candidates.push(v);
            }
        }
        let points = candidates
            .iter()
            .map(|&v| store.point(v))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut map = WeldMap::default();
        for i in 0..candidates.len() {
            if map.is_merged(candidates[i]) {
                continue;
            }
            for j in (i + 1)..candidates.len() {
                if map.is_merged(candidates[j]) {
                    continue;
                }
                if (points[j] - points[i]).norm() <= self.distance {
                    merge_vertex(store, candidates[j], candidates[i])?;
                    map.targets.insert(candidates[j], candidates[i]);
                }
            }
        }
        Ok(map)
    }
}

/// Folds `source` into `target`, rewriting every face and edge using it.
pub(crate) fn merge_vertex(
    store: &mut TopologyStore,
    source: VertexId,
    target: VertexId,
) -> Result<()> {
    for face in store.linked_faces(source) {
        let replaced: Vec<VertexId> = store
            .face(face)?
            .vertices
            .iter()
            .map(|&v| if v == source { target } else { v })
            .collect();
        match collapse_loop(replaced) {
            Some(loop_verts) => store.set_face_vertices(face, loop_verts)?,
            None => {
                store.remove_face(face)?;
            }
        }
    }

    for edge in store.linked_edges(source) {
        let other = store.edge(edge)?.other(source);
        store.remove_edge(edge)?;
        if other != target {
            store.add_edge(target, other)?;
        }
    }
    store.remove_vertex(source)?;
    Ok(())
}

/// Removes consecutive repeats from a loop.
///
/// Returns `None` when fewer than 3 vertices remain or a vertex still occurs
/// twice.
fn collapse_loop(mut verts: Vec<VertexId>) -> Option<Vec<VertexId>> {
    verts.dedup();
    while verts.len() > 1 && verts.first() == verts.last() {
        verts.pop();
    }
    if verts.len() < 3 {
        return None;
    }
    let mut sorted = verts.clone();
    sorted.sort_unstable();
    sorted.dedup();
    (sorted.len() == verts.len()).then_some(verts)
}
