//! Every tolerance used to decide geometric identity lives here.
//!
//! Call sites pick one of these constants instead of inventing their own, so
//! that the meaning of "the same vertex" stays consistent across the pipeline.

/// Tolerance for purely numerical comparisons (determinants, zero lengths).
pub const TOLERANCE: f64 = 1e-10;

/// Two coordinates closer than this are the same column when looking up an
/// existing vertex to reuse.
pub const COLUMN_EPSILON: f64 = 1e-6;

/// Positional weld distance applied after lifting skeleton nodes.
pub const WELD_DISTANCE: f64 = 1e-4;

/// Looser weld distance applied after splitting skeleton edges, absorbing
/// the error accumulated by the split interpolation.
pub const SPLIT_WELD_DISTANCE: f64 = 1e-2;

/// Angular tolerance (radians) under which two boundary edges are treated as
/// collinear.
pub const ANGULAR_TOLERANCE: f64 = 0.01;

/// Returns `true` if `a` and `b` differ by less than `eps`.
#[must_use]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_is_strict() {
        assert!(approx_eq(1.0, 1.0 + 0.5 * WELD_DISTANCE, WELD_DISTANCE));
        assert!(!approx_eq(1.0, 1.0 + WELD_DISTANCE, WELD_DISTANCE));
    }

    #[test]
    fn weld_distances_are_ordered() {
        assert!(COLUMN_EPSILON < WELD_DISTANCE);
        assert!(WELD_DISTANCE < SPLIT_WELD_DISTANCE);
    }
}
