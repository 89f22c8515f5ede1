use crate::error::{OperationError, Result};
use crate::topology::{EdgeId, TopologyStore, VertexId};

/// Result of splitting an edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeSplit {
    /// The vertex inserted on the edge.
    pub vertex: VertexId,
    /// Half between the reference endpoint and the new vertex.
    pub near: EdgeId,
    /// Half between the new vertex and the opposite endpoint.
    pub far: EdgeId,
}

/// Splits an edge in two at a fraction of its length.
///
/// The fraction is measured from `from`. Faces running along the edge get the
/// new vertex inserted into their loop, so they stay closed.
pub struct SplitEdge {
    edge: EdgeId,
    from: VertexId,
    factor: f64,
}

impl SplitEdge {
    /// Creates a new `SplitEdge` operation.
    #[must_use]
    pub fn new(edge: EdgeId, from: VertexId, factor: f64) -> Self {
        Self { edge, from, factor }
    }

    /// Executes the split.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if `from` is not an endpoint
    /// of the edge or the factor lies outside the open interval `(0, 1)`.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<EdgeSplit> {
        let data = store.edge(self.edge)?;
        if !data.contains(self.from) {
            return Err(OperationError::InvalidInput(
                "split reference vertex is not an endpoint of the edge".into(),
            )
            .into());
        }
        if !(self.factor > 0.0 && self.factor < 1.0) {
            return Err(OperationError::InvalidInput(format!(
                "split factor {} outside (0, 1)",
                self.factor
            ))
            .into());
        }
        let to = data.other(self.from);
        let faces = data.faces.clone();

        let a = store.point(self.from)?;
        let b = store.point(to)?;
        let vertex = store.add_vertex(a + (b - a) * self.factor);

        for face in faces {
            let mut loop_verts = store.face(face)?.vertices.clone();
            let n = loop_verts.len();
            let Some(i) = (0..n).find(|&i| {
                let (x, y) = (loop_verts[i], loop_verts[(i + 1) % n]);
                (x == self.from && y == to) || (x == to && y == self.from)
            }) else {
                continue;
            };
            loop_verts.insert(i + 1, vertex);
            store.set_face_vertices(face, loop_verts)?;
        }

        store.remove_edge(self.edge)?;
        let near = store.add_edge(self.from, vertex)?;
        let far = store.add_edge(vertex, to)?;
        Ok(EdgeSplit { vertex, near, far })
    }
}
