//! Roof generation over footprint faces.
//!
//! [`RoofBuilder`] runs the whole pipeline: footprint cleanup, straight
//! skeleton, lifting the skeleton to 3-D, welding it, rebuilding one roof
//! face per footprint edge and finishing the result according to the
//! configured roof type.

mod config;
mod finish;
mod flat;
mod footprint;
mod lift;
mod reconstruct;
pub mod skeleton;
mod weld;

pub use config::{GableType, RoofConfig, RoofType};
pub use finish::{FinishGable, GableFinish};
pub use flat::{FlatSlab, Slab};
pub use footprint::{Footprint, PrepareFootprint};
pub use lift::{LiftSkeleton, SkeletonGraph};
pub use reconstruct::{ReconstructFaces, Reconstruction};
pub use weld::WeldSkeleton;

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info_span, warn};

use crate::error::{OperationError, Result};
use crate::math::{xy, Point2};
use crate::operations::modification::{Delete, DeleteContext, DissolveFaces, RecalcNormals};
use crate::topology::{FaceId, FaceTag, TopologyStore, VertexId};
use skeleton::{skeletonize, validate_ring, ConvexSkeleton, SkeletonMode, Skeletonize};

/// Faces produced by a [`RoofBuilder`] run.
#[derive(Debug, Clone, Default)]
pub struct Roof {
    /// Every face created by the build, grouped by role.
    pub faces_by_tag: BTreeMap<FaceTag, Vec<FaceId>>,
    /// Footprint edges whose roof face could not be closed cleanly.
    pub incomplete: Vec<(VertexId, VertexId)>,
    /// Vertices lowered by the open-gable eave correction.
    pub slope_corrected: Vec<VertexId>,
}

impl Roof {
    /// Faces carrying `tag`.
    #[must_use]
    pub fn faces(&self, tag: FaceTag) -> &[FaceId] {
        self.faces_by_tag.get(&tag).map_or(&[], Vec::as_slice)
    }

    /// All faces of the roof, in tag order.
    pub fn all_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces_by_tag.values().flatten().copied()
    }

    /// Returns `true` if every footprint edge received its roof face.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }
}

/// Builds a roof over a footprint face.
///
/// # Example
///
/// ```
/// use roofline::math::Point3;
/// use roofline::operations::creation::MakeFace;
/// use roofline::roof::{RoofBuilder, RoofConfig};
/// use roofline::topology::{FaceTag, TopologyStore};
///
/// let mut store = TopologyStore::new();
/// let face = MakeFace::new(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(4.0, 0.0, 0.0),
///     Point3::new(4.0, 2.0, 0.0),
///     Point3::new(0.0, 2.0, 0.0),
/// ])
/// .execute(&mut store)
/// .unwrap();
///
/// let roof = RoofBuilder::new(RoofConfig::default())
///     .execute(&mut store, face)
///     .unwrap();
/// assert_eq!(roof.faces(FaceTag::Roof).len(), 4);
/// ```
pub struct RoofBuilder {
    config: RoofConfig,
    skeletonizer: Option<Box<dyn Skeletonize>>,
}

impl RoofBuilder {
    /// Creates a builder using [`ConvexSkeleton`] for the skeleton stage.
    #[must_use]
    pub fn new(config: RoofConfig) -> Self {
        Self {
            config,
            skeletonizer: None,
        }
    }

    /// Replaces the skeleton implementation.
    #[must_use]
    pub fn with_skeletonizer(mut self, skeletonizer: impl Skeletonize + 'static) -> Self {
        self.skeletonizer = Some(Box::new(skeletonizer));
        self
    }

    /// Builds the roof over a single footprint face.
    ///
    /// The store is left as it was if any stage fails.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for invalid options, a `SkeletonError` for a
    /// footprint the skeleton stage rejects, or a `TopologyError` if the
    /// face is missing.
    pub fn execute(&self, store: &mut TopologyStore, face: FaceId) -> Result<Roof> {
        self.config.validate()?;
        let plan: Vec<Point2> = store.face_points(face)?.iter().map(xy).collect();
        validate_ring(&plan)?;
        let span = info_span!("roof", kind = ?self.config.kind);
        let _guard = span.enter();

        let snapshot = store.clone();
        match self.build(store, face) {
            Ok(roof) => Ok(roof),
            Err(err) => {
                warn!(%err, "roof build failed, restoring store");
                *store = snapshot;
                Err(err)
            }
        }
    }

    /// Builds the roof over a connected selection of faces.
    ///
    /// The selection is first dissolved into one footprint face.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the faces do not form one
    /// connected region, or any error from [`execute`](Self::execute). The
    /// selection is left undissolved on error.
    pub fn execute_region(&self, store: &mut TopologyStore, faces: Vec<FaceId>) -> Result<Roof> {
        let snapshot = store.clone();
        let merged = DissolveFaces::new(faces).execute(store)?;
        let result = match merged.as_slice() {
            [face] => self.execute(store, *face),
            _ => Err(OperationError::InvalidInput(format!(
                "footprint selection splits into {} regions",
                merged.len()
            ))
            .into()),
        };
        if result.is_err() {
            *store = snapshot;
        }
        result
    }

    fn build(&self, store: &mut TopologyStore, face: FaceId) -> Result<Roof> {
        let before: HashSet<FaceId> = store.faces().map(|(id, _)| id).collect();
        let mut roof = Roof::default();
        let mut kept = Vec::new();

        match self.config.kind {
            RoofType::Flat => {
                let slab = FlatSlab::new(face, self.config.thickness, self.config.outset)
                    .execute(store)?;
                for &f in &slab.faces {
                    store.set_face_tag(f, FaceTag::Roof)?;
                }
                RecalcNormals::new(slab.faces.clone()).execute(store)?;
                kept = slab.faces;
            }
            RoofType::Hip => {
                let base = self.slab(store, face)?;
                let reconstruction = self.raise(store, base, SkeletonMode::Hip)?;
                roof.incomplete = reconstruction.incomplete;
            }
            RoofType::Gable => {
                let base = match self.config.gable_type {
                    GableType::Box => self.slab(store, face)?,
                    GableType::Open => face,
                };
                let reconstruction = self.raise(store, base, SkeletonMode::Gable)?;
                let finish = FinishGable::new(
                    reconstruction.faces,
                    self.config.gable_type,
                    self.config.thickness,
                    self.config.outset,
                )
                .execute(store)?;
                roof.incomplete = reconstruction.incomplete;
                roof.slope_corrected = finish.slope_corrected;
            }
        }

        for (id, data) in store.faces() {
            if !before.contains(&id) || kept.contains(&id) {
                roof.faces_by_tag.entry(data.tag).or_default().push(id);
            }
        }
        debug!(
            faces = roof.all_faces().count(),
            incomplete = roof.incomplete.len(),
            "roof built"
        );
        Ok(roof)
    }

    /// Replaces the footprint with a slab and returns its top face.
    fn slab(&self, store: &mut TopologyStore, face: FaceId) -> Result<FaceId> {
        let slab = FlatSlab::new(face, self.config.thickness, self.config.outset).execute(store)?;
        for &f in &slab.faces {
            store.set_face_tag(f, FaceTag::RoofHangs)?;
        }
        Ok(slab.top)
    }

    /// Runs the skeleton stages over `base`, consuming the face.
    fn raise(&self, store: &mut TopologyStore, base: FaceId, mode: SkeletonMode) -> Result<Reconstruction> {
        let footprint = PrepareFootprint::new(base).execute(store)?;
        let points = footprint.points(store)?;
        let arcs = match &self.skeletonizer {
            Some(custom) => skeletonize(custom.as_ref(), &points)?,
            None => skeletonize(&ConvexSkeleton::new(mode), &points)?,
        };
        Delete::faces(vec![footprint.face], DeleteContext::FacesOnly).execute(store)?;

        let lifted = LiftSkeleton::new(&footprint, &arcs, self.config.height).execute(store)?;
        let welded = WeldSkeleton::new(&footprint, &lifted).execute(store)?;
        ReconstructFaces::new(&footprint, &welded).execute(store)
    }
}
