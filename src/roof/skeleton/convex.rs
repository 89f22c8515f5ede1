use nalgebra::{Matrix3, Vector3};

use super::{SkeletonArc, SkeletonMode, Skeletonize};
use crate::error::{Result, SkeletonError};
use crate::math::polygon_2d::{left_normal, segment_direction, signed_area_2d};
use crate::math::{Point2, Vector2, COLUMN_EPSILON};

/// Smallest normalised cross product accepted at a convex corner.
const MIN_CORNER_TURN: f64 = 1e-9;

/// Determinant below which three wavefront lines have no common collapse.
const SINGULAR_DETERMINANT: f64 = 1e-12;

/// Straight skeleton of a convex polygon.
///
/// In a convex polygon the wavefront only ever loses edges: each edge
/// shrinks until its two ends meet at the point equidistant from the edge
/// and its two neighbours. Collapses are processed earliest first until
/// three edges remain, which vanish together in one final node.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvexSkeleton {
    mode: SkeletonMode,
}

impl ConvexSkeleton {
    /// Creates a skeletonizer for the given roof mode.
    #[must_use]
    pub fn new(mode: SkeletonMode) -> Self {
        Self { mode }
    }

    /// Skeletonizer for hip roofs.
    #[must_use]
    pub fn hip() -> Self {
        Self::new(SkeletonMode::Hip)
    }

    /// Skeletonizer for gable roofs.
    #[must_use]
    pub fn gable() -> Self {
        Self::new(SkeletonMode::Gable)
    }

    /// The mode this skeletonizer runs in.
    #[must_use]
    pub fn mode(&self) -> SkeletonMode {
        self.mode
    }
}

/// A polygon edge line, offset inward over time: `normal · X = offset + t`.
#[derive(Debug, Clone, Copy)]
struct EdgeLine {
    origin: Point2,
    direction: Vector2,
    normal: Vector2,
    offset: f64,
    length: f64,
}

impl EdgeLine {
    fn foot_of(&self, point: &Point2) -> Point2 {
        self.origin + self.direction * (point - self.origin).dot(&self.direction)
    }
}

/// A corner of the shrinking polygon and where it started.
#[derive(Debug, Clone, Copy)]
struct WavefrontVertex {
    origin: Point2,
    is_corner: bool,
}

impl Skeletonize for ConvexSkeleton {
    fn skeletonize(&self, points: &[Point2], holes: &[Vec<Point2>]) -> Result<Vec<SkeletonArc>> {
        if !holes.is_empty() {
            return Err(SkeletonError::Unsupported("footprints with holes".into()).into());
        }
        let mut ring = points.to_vec();
        if signed_area_2d(&ring) < 0.0 {
            ring.reverse();
        }
        let lines = edge_lines(&ring)?;

        let mut active: Vec<usize> = (0..ring.len()).collect();
        let mut wavefront: Vec<WavefrontVertex> = ring
            .iter()
            .map(|&origin| WavefrontVertex {
                origin,
                is_corner: true,
            })
            .collect();
        let mut arcs: Vec<SkeletonArc> = Vec::new();
        let mut time = 0.0_f64;

        while active.len() > 3 {
            let len = active.len();
            let candidates: Vec<(usize, Point2, f64)> = (0..len)
                .filter_map(|i| {
                    let (point, r) = collapse(
                        &lines[active[(i + len - 1) % len]],
                        &lines[active[i]],
                        &lines[active[(i + 1) % len]],
                    )?;
                    (r >= time - COLUMN_EPSILON).then_some((i, point, r))
                })
                .collect();
            // Simultaneous collapses are taken in ring order.
            let earliest = candidates
                .iter()
                .map(|c| c.2)
                .min_by(f64::total_cmp)
                .and_then(|min| candidates.iter().copied().find(|c| c.2 <= min + COLUMN_EPSILON));
            let Some((i, point, r)) = earliest else {
                return Err(SkeletonError::Degenerate("wavefront stopped collapsing".into()).into());
            };

            let start = wavefront[i];
            let end = wavefront[(i + 1) % len];
            let node = if self.mode == SkeletonMode::Gable && start.is_corner && end.is_corner {
                lines[active[i]].foot_of(&point)
            } else {
                point
            };
            push_arc(&mut arcs, node, &[start.origin, end.origin], r);

            active.remove(i);
            wavefront.remove(i);
            let next = i % active.len();
            wavefront[next] = WavefrontVertex {
                origin: node,
                is_corner: false,
            };
            time = time.max(r);
        }

        let (point, r) = collapse(&lines[active[0]], &lines[active[1]], &lines[active[2]])
            .ok_or_else(|| SkeletonError::Degenerate("final wavefront has no centre".into()))?;
        let node = if self.mode == SkeletonMode::Gable {
            // Edge k of the triangle runs from wavefront[k] to wavefront[k + 1].
            (0..3)
                .filter(|&k| wavefront[k].is_corner && wavefront[(k + 1) % 3].is_corner)
                .min_by(|&a, &b| lines[active[a]].length.total_cmp(&lines[active[b]].length))
                .map_or(point, |k| lines[active[k]].foot_of(&point))
        } else {
            point
        };
        let sinks: Vec<Point2> = wavefront.iter().map(|w| w.origin).collect();
        push_arc(&mut arcs, node, &sinks, r);

        Ok(arcs)
    }
}

fn edge_lines(ring: &[Point2]) -> Result<Vec<EdgeLine>> {
    let n = ring.len();
    let mut lines = Vec::with_capacity(n);
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let direction = segment_direction(&a, &b)?;
        let normal = left_normal(direction);
        lines.push(EdgeLine {
            origin: a,
            direction,
            normal,
            offset: normal.dot(&a.coords),
            length: (b - a).norm(),
        });
    }
    for i in 0..n {
        let prev = &lines[(i + n - 1) % n].direction;
        let next = &lines[i].direction;
        let turn = prev.x * next.y - prev.y * next.x;
        if turn < MIN_CORNER_TURN {
            return Err(SkeletonError::Unsupported(format!(
                "corner {i} at ({}, {}) is reflex or straight",
                ring[i].x, ring[i].y
            ))
            .into());
        }
    }
    Ok(lines)
}

/// Point equidistant from three wavefront lines, with that distance.
fn collapse(a: &EdgeLine, b: &EdgeLine, c: &EdgeLine) -> Option<(Point2, f64)> {
    let m = Matrix3::new(
        a.normal.x, a.normal.y, -1.0, //
        b.normal.x, b.normal.y, -1.0, //
        c.normal.x, c.normal.y, -1.0,
    );
    if m.determinant().abs() < SINGULAR_DETERMINANT {
        return None;
    }
    let solution = m.lu().solve(&Vector3::new(a.offset, b.offset, c.offset))?;
    solution
        .iter()
        .all(|v| v.is_finite())
        .then(|| (Point2::new(solution.x, solution.y), solution.z))
}

/// Appends a node, folding it into an earlier node at the same place and
/// height.
fn push_arc(arcs: &mut Vec<SkeletonArc>, source: Point2, sinks: &[Point2], height: f64) {
    let same = |a: &Point2, b: &Point2| (a - b).norm() < COLUMN_EPSILON;
    if let Some(existing) = arcs
        .iter_mut()
        .find(|arc| same(&arc.source, &source) && (arc.height - height).abs() < COLUMN_EPSILON)
    {
        for sink in sinks {
            if !same(sink, &existing.source) && !existing.sinks.iter().any(|s| same(s, sink)) {
                existing.sinks.push(*sink);
            }
        }
        return;
    }
    arcs.push(SkeletonArc {
        source,
        sinks: sinks.iter().copied().filter(|s| !same(s, &source)).collect(),
        height,
    });
}
