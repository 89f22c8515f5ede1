use crate::error::{OperationError, Result};
use crate::math::Vector3;
use crate::topology::{TopologyStore, VertexId};

/// Moves a set of vertices by a displacement vector.
///
/// Each vertex is moved once even if it is listed several times.
pub struct Translate {
    vertices: Vec<VertexId>,
    displacement: Vector3,
}

impl Translate {
    /// Creates a new `Translate` operation.
    #[must_use]
    pub fn new(vertices: Vec<VertexId>, displacement: Vector3) -> Self {
        Self {
            vertices,
            displacement,
        }
    }

    /// Executes the translation, modifying the vertices in-place.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for a non-finite displacement,
    /// or an error if a vertex is missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        if !self.displacement.iter().all(|c| c.is_finite()) {
            return Err(
                OperationError::InvalidInput("translation must be finite".into()).into(),
            );
        }
        let mut moved = Vec::with_capacity(self.vertices.len());
        for &v in &self.vertices {
            if moved.contains(&v) {
                continue;
            }
            store.vertex_mut(v)?.point += self.displacement;
            moved.push(v);
        }
        Ok(())
    }
}
