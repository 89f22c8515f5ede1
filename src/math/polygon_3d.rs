use super::{Point3, Vector3, TOLERANCE};

/// Unnormalized polygon normal using Newell's method.
///
/// The magnitude is twice the area of the (possibly non-planar) polygon's
/// projection onto its best-fit plane.
#[must_use]
pub fn newell_vector(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    normal
}

/// Unit polygon normal using Newell's method, or `None` for a degenerate loop.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Option<Vector3> {
    let normal = newell_vector(points);
    let len = normal.norm();
    if len < TOLERANCE {
        None
    } else {
        Some(normal / len)
    }
}

/// Mean of the points (the "median" centre used for faces).
#[must_use]
pub fn center_median(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    #[allow(clippy::cast_precision_loss)]
    let count = points.len() as f64;
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_xy() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn ccw_square_normal_points_up() {
        let n = newell_normal(&unit_square_xy()).unwrap_or_else(Vector3::zeros);
        assert!((n.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn vertical_quad_normal_is_horizontal() {
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let n = newell_normal(&pts).unwrap_or_else(Vector3::zeros);
        assert!((n.y + 1.0).abs() < 1e-12);
        assert!(n.z.abs() < 1e-12);
    }

    #[test]
    fn collinear_points_have_no_normal() {
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(newell_normal(&pts).is_none());
    }

    #[test]
    fn center_is_vertex_mean() {
        let pts = unit_square_xy();
        let c = center_median(&pts);
        assert!((c.x - 0.5).abs() < 1e-12);
        assert!((c.y - 0.5).abs() < 1e-12);
    }
}
