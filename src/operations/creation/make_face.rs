use crate::error::Result;
use crate::math::Point3;
use crate::topology::{FaceId, FaceTag, TopologyStore};

/// Creates a face from an ordered loop of points, with fresh vertices.
pub struct MakeFace {
    points: Vec<Point3>,
    tag: FaceTag,
}

impl MakeFace {
    /// Creates a new `MakeFace` operation.
    #[must_use]
    pub fn new(points: Vec<Point3>) -> Self {
        Self {
            points,
            tag: FaceTag::Untagged,
        }
    }

    /// Sets the role tag of the created face.
    #[must_use]
    pub fn with_tag(mut self, tag: FaceTag) -> Self {
        self.tag = tag;
        self
    }

    /// Executes the operation, creating vertices, edges and the face.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 3 points are given.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<FaceId> {
        let vertices = self.points.iter().map(|&p| store.add_vertex(p)).collect();
        Ok(store.add_face(vertices, self.tag)?)
    }
}
