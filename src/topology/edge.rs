use super::face::FaceId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the topology store.
    pub struct EdgeId;
}

/// Data associated with a mesh edge.
///
/// Edges are unordered: `start` and `end` only record the order in which the
/// vertices were passed at creation. The store keeps at most one edge per
/// vertex pair.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// First vertex of the edge.
    pub start: VertexId,
    /// Second vertex of the edge.
    pub end: VertexId,
    /// Faces whose boundary loop runs along this edge.
    pub faces: Vec<FaceId>,
}

impl EdgeData {
    /// Creates a new edge without adjacent faces.
    #[must_use]
    pub fn new(start: VertexId, end: VertexId) -> Self {
        Self {
            start,
            end,
            faces: Vec::new(),
        }
    }

    /// Returns `true` if `vertex` is one of the endpoints.
    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.start == vertex || self.end == vertex
    }

    /// Returns the endpoint opposite to `vertex`.
    ///
    /// If `vertex` is not an endpoint, `start` is returned.
    #[must_use]
    pub fn other(&self, vertex: VertexId) -> VertexId {
        if self.start == vertex {
            self.end
        } else {
            self.start
        }
    }

    /// Both endpoints.
    #[must_use]
    pub fn vertices(&self) -> [VertexId; 2] {
        [self.start, self.end]
    }
}
