//! Math kernel: vector helpers and geometric-algebra rotors.
//!
//! Vectors and matrices come from glam. This module adds the operations the
//! simulation needs that glam does not provide directly: projection and
//! rejection, an orthonormal basis around a normal, and the multivector
//! algebra used for drift-free rotor rotations.

pub mod multivector;

pub use multivector::{Multivector, Rotor};

use glam::{Mat3, Vec3};

/// Project `v` onto the direction of `onto`.
///
/// Returns the zero vector when `onto` is (near) zero length.
#[inline]
pub fn project(v: Vec3, onto: Vec3) -> Vec3 {
    let len_sq = onto.length_squared();
    if len_sq <= f32::EPSILON {
        return Vec3::ZERO;
    }
    onto * (v.dot(onto) / len_sq)
}

/// Remove from `v` its component along `normal`, leaving the part of `v`
/// perpendicular to `normal`.
#[inline]
pub fn reject(v: Vec3, normal: Vec3) -> Vec3 {
    v - project(v, normal)
}

/// Build two unit vectors spanning the plane perpendicular to `normal`.
///
/// `normal` must be non-zero; it does not need to be unit length.
pub fn orthonormal_basis(normal: Vec3) -> (Vec3, Vec3) {
    let n = normal.normalize();
    let tangent = n.any_orthonormal_vector();
    let bitangent = n.cross(tangent);
    (tangent, bitangent)
}

/// Rotate `v` by `angle` radians about the unit axis `axis`.
///
/// Rotations always go through `Mat3::from_axis_angle` so the matrix stays
/// orthonormal; rotation matrices are never mutated element-wise.
#[inline]
pub fn rotate_about_axis(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    Mat3::from_axis_angle(axis, angle) * v
}

/// Project a point set onto an axis, returning the (min, max) interval.
///
/// Used by the separating axis tests. The axis need not be normalized; the
/// interval is then in axis-scaled units, which is consistent as long as both
/// point sets use the same axis.
pub fn projection_bounds(axis: Vec3, points: impl IntoIterator<Item = Vec3>) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for p in points {
        let d = p.dot(axis);
        if d < min {
            min = d;
        }
        if d > max {
            max = d;
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vec(rng: &mut StdRng) -> Vec3 {
        Vec3::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        )
    }

    #[test]
    fn test_dot_commutes() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let a = random_vec(&mut rng);
            let b = random_vec(&mut rng);
            assert!((a.dot(b) - b.dot(a)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_lagrange_identity() {
        // |a x b|^2 + (a . b)^2 = |a|^2 |b|^2
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..32 {
            let a = random_vec(&mut rng);
            let b = random_vec(&mut rng);
            let lhs = a.cross(b).length_squared() + a.dot(b) * a.dot(b);
            let rhs = a.length_squared() * b.length_squared();
            // Relative tolerance: magnitudes here reach ~1e4.
            assert!((lhs - rhs).abs() < 1e-2 * rhs.max(1.0));
        }
    }

    #[test]
    fn test_axis_angle_roundtrip() {
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..32 {
            let v = random_vec(&mut rng);
            let axis = random_vec(&mut rng).normalize();
            let angle = rng.gen_range(-3.0..3.0f32);
            let back = rotate_about_axis(rotate_about_axis(v, axis, angle), axis, -angle);
            assert!((back - v).length() < 1e-4, "roundtrip drift: {:?}", back - v);
        }
    }

    #[test]
    fn test_project_reject_decompose() {
        let v = Vec3::new(3.0, 4.0, -2.0);
        let n = Vec3::new(0.0, 1.0, 0.0);
        let p = project(v, n);
        let r = reject(v, n);
        assert!((p - Vec3::new(0.0, 4.0, 0.0)).length() < 1e-6);
        assert!((p + r - v).length() < 1e-6);
        assert!(r.dot(n).abs() < 1e-6);
    }

    #[test]
    fn test_projection_of_zero_axis() {
        assert_eq!(project(Vec3::ONE, Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_orthonormal_basis() {
        let (t, b) = orthonormal_basis(Vec3::new(0.3, -0.9, 0.1));
        let n = Vec3::new(0.3, -0.9, 0.1).normalize();
        assert!(t.dot(n).abs() < 1e-6);
        assert!(b.dot(n).abs() < 1e-6);
        assert!(t.dot(b).abs() < 1e-6);
        assert!((t.length() - 1.0).abs() < 1e-6);
        assert!((b.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_projection_bounds() {
        let points = [Vec3::new(-1.0, 0.0, 0.0), Vec3::new(2.0, 5.0, 0.0)];
        let (min, max) = projection_bounds(Vec3::X, points);
        assert_eq!(min, -1.0);
        assert_eq!(max, 2.0);
    }
}
