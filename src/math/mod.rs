pub mod intersect_2d;
pub mod polygon_2d;
pub mod polygon_3d;
pub mod tolerance;

pub use tolerance::{
    approx_eq, ANGULAR_TOLERANCE, COLUMN_EPSILON, SPLIT_WELD_DISTANCE, TOLERANCE, WELD_DISTANCE,
};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Drops the z coordinate of a point.
#[must_use]
pub fn xy(p: &Point3) -> Point2 {
    Point2::new(p.x, p.y)
}
