//! Multivectors and rotors for geometric-algebra rotations.
//!
//! A multivector over a `d`-dimensional Euclidean space is an array of `2^d`
//! scalars, one per basis blade, indexed by the bitmask of the basis vectors
//! the blade contains (bit 0 = e1, bit 1 = e2, ...). The geometric product of
//! two basis blades is the blade with index `a ^ b`, signed by the parity of
//! the swaps needed to sort the concatenated basis indices; repeated basis
//! vectors contract to +1 (Euclidean metric).
//!
//! Rotors (unit elements of the even subalgebra) rotate vectors by the
//! sandwich product `R v R~`. Unlike composed axis-angle matrices they can be
//! renormalized cheaply, so long chains of incremental rotations do not drift.

use glam::Vec3;

/// A dense multivector in up to 3 dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Multivector {
    dim: usize,
    components: Vec<f32>,
}

/// Sign of the geometric product of basis blades `a` and `b`.
///
/// Counts the transpositions needed to move each basis vector of `b` past the
/// higher-indexed basis vectors of `a`; odd counts flip the sign.
fn blade_product_sign(a: u32, b: u32) -> f32 {
    let mut a = a >> 1;
    let mut swaps = 0u32;
    while a != 0 {
        swaps += (a & b).count_ones();
        a >>= 1;
    }
    if swaps & 1 == 0 {
        1.0
    } else {
        -1.0
    }
}

impl Multivector {
    /// The zero multivector of the given dimension (`dim <= 3`).
    pub fn zero(dim: usize) -> Self {
        assert!(dim <= 3, "multivectors are supported up to 3 dimensions");
        Self {
            dim,
            components: vec![0.0; 1 << dim],
        }
    }

    /// A scalar multivector.
    pub fn scalar(dim: usize, value: f32) -> Self {
        let mut mv = Self::zero(dim);
        mv.components[0] = value;
        mv
    }

    /// A grade-1 multivector from a 3-vector.
    pub fn from_vec3(v: Vec3) -> Self {
        let mut mv = Self::zero(3);
        mv.components[0b001] = v.x;
        mv.components[0b010] = v.y;
        mv.components[0b100] = v.z;
        mv
    }

    /// The dimension of the underlying space.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The coefficient of the basis blade with the given bitmask index.
    pub fn component(&self, blade: usize) -> f32 {
        self.components[blade]
    }

    /// Mutable access to a blade coefficient.
    pub fn component_mut(&mut self, blade: usize) -> &mut f32 {
        &mut self.components[blade]
    }

    /// The grade-1 part as a 3-vector (zero-padded below dimension 3).
    pub fn vector_part(&self) -> Vec3 {
        Vec3::new(
            self.components.get(0b001).copied().unwrap_or(0.0),
            self.components.get(0b010).copied().unwrap_or(0.0),
            self.components.get(0b100).copied().unwrap_or(0.0),
        )
    }

    /// Geometric product `self * rhs`.
    ///
    /// The result lives in the larger of the two spaces; the smaller operand
    /// is implicitly zero-extended.
    pub fn product(&self, rhs: &Multivector) -> Multivector {
        let dim = self.dim.max(rhs.dim);
        let mut out = Multivector::zero(dim);
        for (i, &a) in self.components.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for (j, &b) in rhs.components.iter().enumerate() {
                if b == 0.0 {
                    continue;
                }
                let blade = i ^ j;
                out.components[blade] += blade_product_sign(i as u32, j as u32) * a * b;
            }
        }
        out
    }

    /// Grade reversal: each grade-g blade picks up the sign `(-1)^(g(g-1)/2)`.
    pub fn reverse(&self) -> Multivector {
        let mut out = self.clone();
        for (i, c) in out.components.iter_mut().enumerate() {
            let g = (i as u32).count_ones();
            if (g * (g.wrapping_sub(1)) / 2) & 1 == 1 {
                *c = -*c;
            }
        }
        out
    }

    /// Squared magnitude: the scalar part of `self * reverse(self)`.
    pub fn magnitude_squared(&self) -> f32 {
        self.product(&self.reverse()).components[0]
    }
}

/// A unit rotor in 3D: scalar + bivector, the even subalgebra of G(3).
#[derive(Debug, Clone, PartialEq)]
pub struct Rotor(Multivector);

impl Rotor {
    /// The rotor rotating by `angle` radians about the unit `axis`.
    ///
    /// Built as `cos(a/2) - sin(a/2) B` where `B` is the unit bivector dual
    /// to the axis.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let half = 0.5 * angle;
        let s = half.sin();
        let mut mv = Multivector::zero(3);
        mv.components[0b000] = half.cos();
        // Dual of (x, y, z): x e23 + y e31 + z e12.
        mv.components[0b110] = -s * axis.x;
        mv.components[0b101] = s * axis.y;
        mv.components[0b011] = -s * axis.z;
        Rotor(mv)
    }

    /// The underlying multivector.
    pub fn as_multivector(&self) -> &Multivector {
        &self.0
    }

    /// Compose with another rotor; `self` is applied second.
    pub fn compose(&self, first: &Rotor) -> Rotor {
        Rotor(self.0.product(&first.0))
    }

    /// Rescale to unit magnitude. Incremental rotor chains call this instead
    /// of re-orthonormalizing a matrix.
    pub fn normalized(&self) -> Rotor {
        let mag = self.0.magnitude_squared().sqrt();
        let mut mv = self.0.clone();
        if mag > f32::EPSILON {
            for c in mv.components.iter_mut() {
                *c /= mag;
            }
        }
        Rotor(mv)
    }

    /// Rotate a vector by the sandwich product `R v R~`.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let v = Multivector::from_vec3(v);
        self.0.product(&v).product(&self.0.reverse()).vector_part()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::rotate_about_axis;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_mv(rng: &mut StdRng) -> Multivector {
        let mut mv = Multivector::zero(3);
        for i in 0..8 {
            *mv.component_mut(i) = rng.gen_range(-2.0..2.0);
        }
        mv
    }

    #[test]
    fn test_basis_products() {
        let mut e1 = Multivector::zero(3);
        *e1.component_mut(0b001) = 1.0;
        let mut e2 = Multivector::zero(3);
        *e2.component_mut(0b010) = 1.0;

        // e1 e2 = e12
        let e12 = e1.product(&e2);
        assert_eq!(e12.component(0b011), 1.0);

        // e2 e1 = -e12
        let e21 = e2.product(&e1);
        assert_eq!(e21.component(0b011), -1.0);

        // e1 e1 = 1
        let sq = e1.product(&e1);
        assert_eq!(sq.component(0), 1.0);
    }

    #[test]
    fn test_product_associative() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..16 {
            let a = random_mv(&mut rng);
            let b = random_mv(&mut rng);
            let c = random_mv(&mut rng);
            let left = a.product(&b).product(&c);
            let right = a.product(&b.product(&c));
            for i in 0..8 {
                assert!(
                    (left.component(i) - right.component(i)).abs() < 1e-3,
                    "associativity failed at blade {i}"
                );
            }
        }
    }

    #[test]
    fn test_rotor_times_reverse_is_one() {
        let rotor = Rotor::from_axis_angle(Vec3::new(1.0, 2.0, -0.5).normalize(), 1.3);
        let product = rotor
            .as_multivector()
            .product(&rotor.as_multivector().reverse());
        assert!((product.component(0) - 1.0).abs() < 1e-5);
        for i in 1..8 {
            assert!(product.component(i).abs() < 1e-5, "non-scalar blade {i}");
        }
    }

    #[test]
    fn test_rotor_matches_matrix_rotation() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..16 {
            let axis = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
            .normalize();
            let angle = rng.gen_range(-3.0..3.0f32);
            let v = Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            let by_rotor = Rotor::from_axis_angle(axis, angle).rotate(v);
            let by_matrix = rotate_about_axis(v, axis, angle);
            assert!(
                (by_rotor - by_matrix).length() < 1e-4,
                "rotor {by_rotor:?} vs matrix {by_matrix:?}"
            );
        }
    }

    #[test]
    fn test_rotor_chain_normalizes() {
        // Many composed increments stay unit after renormalization.
        let step = Rotor::from_axis_angle(Vec3::Y, 0.01);
        let mut acc = Rotor::from_axis_angle(Vec3::Y, 0.0);
        for _ in 0..1000 {
            acc = step.compose(&acc).normalized();
        }
        assert!((acc.as_multivector().magnitude_squared() - 1.0).abs() < 1e-4);
    }
}
