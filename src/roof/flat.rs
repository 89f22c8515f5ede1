use tracing::debug;

use crate::error::Result;
use crate::math::polygon_2d::{outset_ring, signed_area_2d};
use crate::math::{xy, Point2, Point3, Vector3};
use crate::operations::modification::{Delete, DeleteContext};
use crate::topology::{FaceId, FaceTag, TopologyStore, VertexId};

/// Faces of a slab built over a footprint.
#[derive(Debug, Clone)]
pub struct Slab {
    /// The upper cap, resting `thickness` above the outset ring.
    pub top: FaceId,
    /// Every slab face, the top included.
    pub faces: Vec<FaceId>,
}

/// Replaces a footprint face with a slab of the given thickness whose rim
/// overhangs the footprint by `outset`.
///
/// Below the rim a downward-facing ring joins the footprint boundary to the
/// overhang; the footprint face itself is removed, leaving the underside
/// open. With both parameters at zero the footprint face is returned as the
/// slab top.
pub struct FlatSlab {
    face: FaceId,
    thickness: f64,
    outset: f64,
}

impl FlatSlab {
    /// Creates a new `FlatSlab` operation.
    #[must_use]
    pub fn new(face: FaceId, thickness: f64, outset: f64) -> Self {
        Self {
            face,
            thickness,
            outset,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is missing or its boundary has a
    /// zero-length edge.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Slab> {
        let mut footprint: Vec<VertexId> = store.face(self.face)?.vertices.clone();
        let mut points: Vec<Point3> = store.face_points(self.face)?;
        let mut plan: Vec<Point2> = points.iter().map(xy).collect();
        if signed_area_2d(&plan) < 0.0 {
            footprint.reverse();
            points.reverse();
            plan.reverse();
        }

        if self.thickness <= 0.0 && self.outset <= 0.0 {
            return Ok(Slab {
                top: self.face,
                faces: vec![self.face],
            });
        }

        let mut faces = Vec::new();
        let n = footprint.len();

        let rim = if self.outset > 0.0 {
            let ring = outset_ring(&plan, self.outset)?;
            let rim: Vec<VertexId> = ring
                .iter()
                .zip(&points)
                .map(|(q, p)| store.add_vertex(Point3::new(q.x, q.y, p.z)))
                .collect();
            for i in 0..n {
                let j = (i + 1) % n;
                let quad = vec![footprint[i], footprint[j], rim[j], rim[i]];
                faces.push(store.add_face(quad, FaceTag::Untagged)?);
            }
            rim
        } else {
            footprint.clone()
        };

        let top_ring = if self.thickness > 0.0 {
            let lift = Vector3::new(0.0, 0.0, self.thickness);
            let mut top_ring = Vec::with_capacity(n);
            for &v in &rim {
                let p = store.point(v)? + lift;
                top_ring.push(store.add_vertex(p));
            }
            for i in 0..n {
                let j = (i + 1) % n;
                let quad = vec![rim[i], rim[j], top_ring[j], top_ring[i]];
                faces.push(store.add_face(quad, FaceTag::Untagged)?);
            }
            top_ring
        } else {
            rim
        };

        let top = store.add_face(top_ring, FaceTag::Untagged)?;
        faces.push(top);
        Delete::faces(vec![self.face], DeleteContext::FacesOnly).execute(store)?;

        debug!(faces = faces.len(), "built slab");
        Ok(Slab { top, faces })
    }
}
