use std::cmp::Ordering;

use super::intersect_2d::segment_segment_intersect_2d;
use super::{Point2, Vector2, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Index of the lexicographically largest `(x, y)` point.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn max_lexicographic_index(points: &[Point2]) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            a.x.partial_cmp(&b.x)
                .unwrap_or(Ordering::Equal)
                .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
        })
        .map(|(i, _)| i)
}

/// Computes the normalized direction from point `a` to point `b`.
///
/// # Errors
///
/// Returns `GeometryError::ZeroVector` if the segment has zero length.
pub fn segment_direction(a: &Point2, b: &Point2) -> Result<Vector2> {
    let d = b - a;
    let len = d.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(d / len)
}

/// Returns the left-pointing normal of a direction vector.
///
/// For a counter-clockwise ring this points into the polygon.
#[must_use]
pub fn left_normal(dir: Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}

/// Returns `true` if any two non-adjacent edges of the closed ring intersect.
#[must_use]
pub fn has_self_intersection(points: &[Point2]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let a0 = &points[i];
        let a1 = &points[(i + 1) % n];
        for j in (i + 2)..n {
            // The first and last edges share a vertex.
            if i == 0 && j == n - 1 {
                continue;
            }
            let b0 = &points[j];
            let b1 = &points[(j + 1) % n];
            if segment_segment_intersect_2d(a0, a1, b0, b1).is_some() {
                return true;
            }
        }
    }
    false
}

/// Offsets a counter-clockwise ring outward by `distance` with mitred corners.
///
/// Each vertex moves to the intersection of its two adjacent edge lines after
/// both are pushed outward, so every edge ends up exactly `distance` away from
/// its original line. Collinear neighbours fall back to a plain normal shift.
///
/// # Errors
///
/// Returns `GeometryError::ZeroVector` if the ring contains a zero-length edge.
pub fn outset_ring(points: &[Point2], distance: f64) -> Result<Vec<Point2>> {
    let n = points.len();
    let mut directions = Vec::with_capacity(n);
    for i in 0..n {
        directions.push(segment_direction(&points[i], &points[(i + 1) % n])?);
    }

    let mut result = Vec::with_capacity(n);
    for i in 0..n {
        let prev_dir = directions[(i + n - 1) % n];
        let next_dir = directions[i];
        // Outward is the right-hand side of a counter-clockwise ring.
        let prev_out = -left_normal(prev_dir);
        let next_out = -left_normal(next_dir);

        let prev_origin = points[(i + n - 1) % n] + prev_out * distance;
        let next_origin = points[i] + next_out * distance;

        let corner = match super::intersect_2d::line_line_intersect_2d(
            &prev_origin,
            &prev_dir,
            &next_origin,
            &next_dir,
        ) {
            Some((t, _)) => prev_origin + prev_dir * t,
            None => points[i] + next_out * distance,
        };
        result.push(corner);
    }
    Ok(result)
}
