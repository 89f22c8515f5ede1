use std::collections::HashSet;

use tracing::debug;

use super::config::GableType;
use crate::error::{OperationError, Result};
use crate::math::{approx_eq, Vector3, COLUMN_EPSILON, TOLERANCE};
use crate::operations::modification::{Delete, DeleteContext, DissolveEdges};
use crate::operations::shaping::{ExtrudeRegion, InsetRegion};
use crate::operations::transform::Translate;
use crate::topology::{EdgeId, FaceId, FaceTag, TopologyStore, VertexId};

/// What [`FinishGable`] produced.
#[derive(Debug, Clone, Default)]
pub struct GableFinish {
    /// Vertical strips around the thickened roof.
    pub side_faces: Vec<FaceId>,
    /// Vertices moved down by the eave slope correction.
    pub slope_corrected: Vec<VertexId>,
}

/// Gives a reconstructed gable roof its thickness and overhang.
///
/// Up-facing faces are the roof covering; the rest are gable walls and are
/// tagged [`FaceTag::Walls`].
pub struct FinishGable {
    faces: Vec<FaceId>,
    gable_type: GableType,
    thickness: f64,
    outset: f64,
}

impl FinishGable {
    /// Creates a new `FinishGable` operation over the reconstructed faces.
    #[must_use]
    pub fn new(faces: Vec<FaceId>, gable_type: GableType, thickness: f64, outset: f64) -> Self {
        Self {
            faces,
            gable_type,
            thickness,
            outset,
        }
    }

    /// Executes the finishing pass.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if no face points upward, or
    /// an error if one of the faces is missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<GableFinish> {
        let mut roof = Vec::new();
        for &f in &self.faces {
            if store.face_normal(f)?.z > COLUMN_EPSILON {
                roof.push(f);
            } else {
                store.set_face_tag(f, FaceTag::Walls)?;
            }
        }
        if roof.is_empty() {
            return Err(OperationError::InvalidInput("gable roof has no up-facing faces".into()).into());
        }

        match self.gable_type {
            GableType::Box => self.finish_box(store, roof),
            GableType::Open => self.finish_open(store, roof),
        }
    }

    /// Lifts the covering off the footprint, closing its rim with strips.
    fn finish_box(&self, store: &mut TopologyStore, roof: Vec<FaceId>) -> Result<GableFinish> {
        let extrusion = ExtrudeRegion::new(roof.clone(), Vector3::new(0.0, 0.0, self.thickness))
            .keep_original(true)
            .execute(store)?;
        Delete::faces(roof, DeleteContext::Faces).execute(store)?;

        for &f in &extrusion.top_faces {
            store.set_face_tag(f, FaceTag::Roof)?;
        }
        for &f in &extrusion.side_faces {
            store.set_face_tag(f, FaceTag::RoofHangs)?;
        }
        debug!(sides = extrusion.side_faces.len(), "finished box gable");
        Ok(GableFinish {
            side_faces: extrusion.side_faces,
            slope_corrected: Vec::new(),
        })
    }

    /// Thickens the covering and pushes its rim outward to form overhangs.
    fn finish_open(&self, store: &mut TopologyStore, roof: Vec<FaceId>) -> Result<GableFinish> {
        for &f in &roof {
            store.set_face_tag(f, FaceTag::Walls)?;
        }
        let extrusion = ExtrudeRegion::new(roof.clone(), Vector3::new(0.0, 0.0, self.thickness))
            .keep_original(true)
            .execute(store)?;
        Delete::faces(roof, DeleteContext::FacesOnly).execute(store)?;

        let tops: HashSet<FaceId> = extrusion.top_faces.iter().copied().collect();
        let mut sides = Vec::new();
        for &f in &extrusion.side_faces {
            let mut shared = 0;
            for e in store.face_edges(f)? {
                if store.edge(e)?.faces.iter().any(|g| tops.contains(g)) {
                    shared += 1;
                }
            }
            if shared == 1 {
                sides.push(f);
            }
        }

        let mut marked = Vec::new();
        for &f in &sides {
            if let Some(edge) = highest_sloped_edge(store, f)? {
                marked.push(edge);
            }
        }

        let mut slope_corrected = Vec::new();
        if self.outset > 0.0 {
            InsetRegion::new(sides.clone(), self.outset).execute(store)?;
            slope_corrected = self.correct_slope(store, &sides)?;
            marked.retain(|&e| store.contains_edge(e));
            DissolveEdges::new(marked).execute(store)?;
        }
        for &v in extrusion.vertices.values() {
            if store.contains_vertex(v) && store.linked_edges(v).is_empty() {
                store.remove_vertex(v)?;
            }
        }

        for &f in &sides {
            for g in store.adjacent_faces(f)? {
                let z = store.face_normal(g)?.z;
                if z > COLUMN_EPSILON {
                    store.set_face_tag(g, FaceTag::Roof)?;
                } else if z < -COLUMN_EPSILON {
                    store.set_face_tag(g, FaceTag::RoofHangs)?;
                }
            }
        }
        for &f in &sides {
            store.set_face_tag(f, FaceTag::RoofHangs)?;
        }
        for &f in &extrusion.top_faces {
            if store.contains_face(f) && store.face_normal(f)?.z > COLUMN_EPSILON {
                store.set_face_tag(f, FaceTag::Roof)?;
            }
        }

        debug!(
            sides = sides.len(),
            corrected = slope_corrected.len(),
            "finished open gable"
        );
        Ok(GableFinish {
            side_faces: sides,
            slope_corrected,
        })
    }

    /// Drops the lowest vertical strip edges by half the overhang so the
    /// eave follows the roof slope.
    fn correct_slope(&self, store: &mut TopologyStore, sides: &[FaceId]) -> Result<Vec<VertexId>> {
        let mut vertical: Vec<(EdgeId, f64)> = Vec::new();
        for &f in sides {
            for e in store.face_edges(f)? {
                if vertical.iter().any(|&(seen, _)| seen == e) || !is_vertical(store, e)? {
                    continue;
                }
                vertical.push((e, store.edge_median(e)?.z));
            }
        }
        let Some(lowest) = vertical.iter().map(|&(_, z)| z).reduce(f64::min) else {
            debug!("no vertical strip edges, slope correction skipped");
            return Ok(Vec::new());
        };

        let mut moved = Vec::new();
        for &(e, z) in &vertical {
            if !approx_eq(z, lowest, COLUMN_EPSILON) {
                continue;
            }
            for v in store.edge(e)?.vertices() {
                if !moved.contains(&v) {
                    moved.push(v);
                }
            }
        }
        Translate::new(moved.clone(), Vector3::new(0.0, 0.0, -self.outset / 2.0)).execute(store)?;
        Ok(moved)
    }
}

fn is_vertical(store: &TopologyStore, edge: EdgeId) -> Result<bool> {
    let data = store.edge(edge)?;
    let d = store.point(data.end)? - store.point(data.start)?;
    let length = d.norm();
    Ok(length > TOLERANCE && d.xy().norm() <= COLUMN_EPSILON * length)
}

/// The non-vertical edge of `face` with the highest midpoint.
fn highest_sloped_edge(store: &TopologyStore, face: FaceId) -> Result<Option<EdgeId>> {
    let mut best: Option<(EdgeId, f64)> = None;
    for e in store.face_edges(face)? {
        if is_vertical(store, e)? || store.edge_length(e)? <= TOLERANCE {
            continue;
        }
        let z = store.edge_median(e)?.z;
        if best.is_none_or(|(_, top)| z >= top) {
            best = Some((e, z));
        }
    }
    Ok(best.map(|(e, _)| e))
}
