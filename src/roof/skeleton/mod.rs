//! Straight-skeleton computation behind a pluggable interface.

mod convex;

pub use convex::ConvexSkeleton;

use tracing::debug;

use crate::error::{Result, SkeletonError};
use crate::math::polygon_2d::{has_self_intersection, signed_area_2d};
use crate::math::{Point2, TOLERANCE};

/// One node of a straight skeleton and the points it connects down to.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonArc {
    /// Where the wavefront collapsed.
    pub source: Point2,
    /// Polygon corners or earlier nodes joined to `source` by a skeleton edge.
    pub sinks: Vec<Point2>,
    /// Distance of `source` from the polygon edges that met there.
    pub height: f64,
}

/// Which kind of roof the skeleton is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkeletonMode {
    /// Every edge slopes; ends are hipped.
    #[default]
    Hip,
    /// End collapses are pushed out onto their edge, giving vertical gables.
    Gable,
}

/// A straight-skeleton implementation.
///
/// `points` is a counter-clockwise ring without repeated points. Holes are
/// passed for completeness; the roof pipeline never uses them.
pub trait Skeletonize {
    /// Computes the skeleton arcs of the polygon.
    ///
    /// # Errors
    ///
    /// Returns a [`SkeletonError`] if the polygon cannot be processed.
    fn skeletonize(&self, points: &[Point2], holes: &[Vec<Point2>]) -> Result<Vec<SkeletonArc>>;
}

impl<F> Skeletonize for F
where
    F: Fn(&[Point2], &[Vec<Point2>]) -> Result<Vec<SkeletonArc>>,
{
    fn skeletonize(&self, points: &[Point2], holes: &[Vec<Point2>]) -> Result<Vec<SkeletonArc>> {
        self(points, holes)
    }
}

/// Checks that `points` describe a simple polygon with non-zero area.
///
/// Returns the signed area of the ring.
///
/// # Errors
///
/// Returns [`SkeletonError::InvalidGeometry`] for fewer than three points,
/// a zero-area ring or a self-intersecting ring.
pub fn validate_ring(points: &[Point2]) -> Result<f64> {
    let invalid = |reason: String| SkeletonError::InvalidGeometry {
        points: points.len(),
        reason,
    };
    if points.len() < 3 {
        return Err(invalid("at least 3 points are required".into()).into());
    }
    let area = signed_area_2d(points);
    if area.abs() < TOLERANCE || !area.is_finite() {
        return Err(invalid(format!("area {area} is zero")).into());
    }
    if has_self_intersection(points) {
        return Err(invalid("ring intersects itself".into()).into());
    }
    Ok(area)
}

/// Validates a footprint ring and runs `skeletonizer` on it.
///
/// The ring is normalised to counter-clockwise order first.
///
/// # Errors
///
/// Returns the errors of [`validate_ring`], and
/// [`SkeletonError::Degenerate`] if the implementation returns no arcs.
pub fn skeletonize(skeletonizer: &dyn Skeletonize, points: &[Point2]) -> Result<Vec<SkeletonArc>> {
    let area = validate_ring(points)?;

    let mut ring = points.to_vec();
    if area < 0.0 {
        ring.reverse();
    }
    let arcs = skeletonizer.skeletonize(&ring, &[])?;
    if arcs.is_empty() {
        return Err(SkeletonError::Degenerate("skeleton has no arcs".into()).into());
    }
    debug!(points = ring.len(), arcs = arcs.len(), "computed straight skeleton");
    Ok(arcs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::RooflineError;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn closures_are_skeletonizers() {
        let seen = RefCell::new(Vec::new());
        let recorder = |points: &[Point2], holes: &[Vec<Point2>]| -> Result<Vec<SkeletonArc>> {
            assert!(holes.is_empty());
            seen.borrow_mut().extend_from_slice(points);
            Ok(vec![SkeletonArc {
                source: p(0.5, 0.5),
                sinks: points.to_vec(),
                height: 0.5,
            }])
        };
        let clockwise = [p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)];
        let arcs = skeletonize(&recorder, &clockwise).unwrap();
        assert_eq!(arcs.len(), 1);
        assert!(signed_area_2d(&seen.borrow()) > 0.0);
    }

    #[test]
    fn invalid_rings_never_reach_the_implementation() {
        let never = |_: &[Point2], _: &[Vec<Point2>]| -> Result<Vec<SkeletonArc>> {
            panic!("must not be called")
        };
        let cases: [&[Point2]; 3] = [
            &[p(0.0, 0.0), p(1.0, 0.0)],
            &[p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)],
            &[p(0.0, 0.0), p(1.0, 1.0), p(1.0, 0.0), p(0.0, 1.0)],
        ];
        for ring in cases {
            let err = skeletonize(&never, ring).unwrap_err();
            assert!(matches!(
                err,
                RooflineError::Skeleton(SkeletonError::InvalidGeometry { .. })
            ));
        }
    }

    #[test]
    fn empty_result_is_degenerate() {
        let nothing = |_: &[Point2], _: &[Vec<Point2>]| -> Result<Vec<SkeletonArc>> { Ok(Vec::new()) };
        let err = skeletonize(&nothing, &[p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)]).unwrap_err();
        assert!(matches!(err, RooflineError::Skeleton(SkeletonError::Degenerate(_))));
    }
}
