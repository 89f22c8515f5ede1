use serde::{Deserialize, Serialize};

use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// Role of a face in the finished roof, consumed by material assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaceTag {
    /// Not assigned to any role yet.
    #[default]
    Untagged,
    /// Sloped or flat roof covering.
    Roof,
    /// Overhangs, soffits and slab edges.
    RoofHangs,
    /// Gable end walls.
    Walls,
}

/// Data associated with a mesh face.
///
/// The boundary is an ordered, closed loop of vertices; the edge between
/// consecutive vertices always exists in the store. The loop order defines the
/// face normal by the right-hand rule.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// Ordered boundary loop.
    pub vertices: Vec<VertexId>,
    /// Role of the face.
    pub tag: FaceTag,
}

impl FaceData {
    /// Creates a new face from its boundary loop.
    #[must_use]
    pub fn new(vertices: Vec<VertexId>, tag: FaceTag) -> Self {
        Self { vertices, tag }
    }

    /// Consecutive vertex pairs of the loop, including the closing pair.
    pub fn loop_pairs(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Returns `true` if the loop runs from `a` directly to `b`.
    #[must_use]
    pub fn has_directed_pair(&self, a: VertexId, b: VertexId) -> bool {
        self.loop_pairs().any(|(x, y)| x == a && y == b)
    }

    /// Returns `true` if `vertex` is part of the loop.
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }
}
