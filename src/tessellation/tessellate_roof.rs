use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Result;
use crate::roof::Roof;
use crate::topology::{FaceTag, TopologyStore};

use super::{TessellateFaces, TriangleMesh};

/// Triangulates a finished roof into one mesh per face tag.
///
/// Tags map to materials downstream, so each mesh can be exported as its
/// own surface.
pub struct TessellateRoof<'a> {
    roof: &'a Roof,
}

impl<'a> TessellateRoof<'a> {
    /// Creates a new `TessellateRoof` operation.
    #[must_use]
    pub fn new(roof: &'a Roof) -> Self {
        Self { roof }
    }

    /// Executes the tessellation.
    ///
    /// # Errors
    ///
    /// Returns an error if any roof face cannot be triangulated.
    pub fn execute(&self, store: &TopologyStore) -> Result<BTreeMap<FaceTag, TriangleMesh>> {
        let mut meshes = BTreeMap::new();
        for (&tag, faces) in &self.roof.faces_by_tag {
            let mesh = TessellateFaces::new(faces.clone()).execute(store)?;
            debug!(?tag, triangles = mesh.triangle_count(), "tessellated roof faces");
            meshes.insert(tag, mesh);
        }
        Ok(meshes)
    }
}
