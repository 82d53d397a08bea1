//! Frame of reference: position, rotation, and non-uniform scale.

use glam::{Mat3, Mat4, Vec3};

/// The placement of an entity in world space.
///
/// Rotation is kept as an orthonormal 3x3 matrix; it is only ever changed by
/// composing axis-angle rotations built through `Mat3::from_axis_angle`, so
/// orthonormality is preserved by construction. Scale is a per-axis diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOfReference {
    pub position: Vec3,
    pub rotation: Mat3,
    pub scale: Vec3,
}

impl Default for FrameOfReference {
    fn default() -> Self {
        Self::identity()
    }
}

impl FrameOfReference {
    /// The identity frame at the origin.
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// A frame at the given position with identity rotation and unit scale.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Translate the frame by `delta` in world space.
    #[inline]
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Rotate the frame by `angle` radians about the unit world-space `axis`.
    ///
    /// The new orientation is `R(axis, angle) * rotation`, a fresh orthonormal
    /// matrix each time.
    pub fn rotate(&mut self, axis: Vec3, angle: f32) {
        self.rotation = Mat3::from_axis_angle(axis, angle) * self.rotation;
    }

    /// Set a uniform scale.
    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = Vec3::splat(s);
    }

    /// Flatten to a model matrix: translate ∘ rotate ∘ scale.
    pub fn to_matrix4(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_mat3(self.rotation)
            * Mat4::from_scale(self.scale)
    }

    /// Rotation and scale only, for transforming offsets that stay in
    /// object-local form.
    #[inline]
    pub fn rotate_scale(&self) -> Mat3 {
        self.rotation * Mat3::from_diagonal(self.scale)
    }

    /// Transform an object-space point into world space.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * (self.scale * p) + self.position
    }

    /// Rotate an object-space direction into world space (no scale, no
    /// translation).
    #[inline]
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.rotation * d
    }

    /// The largest absolute scale factor, used for conservative radius
    /// scaling.
    #[inline]
    pub fn max_scale(&self) -> f32 {
        self.scale.abs().max_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_inverse_is_identity() {
        let mut frame = FrameOfReference::identity();
        let axis = Vec3::new(0.2, 1.0, -0.4).normalize();
        frame.rotate(axis, 1.1);
        frame.rotate(axis, -1.1);

        let diff = frame.rotation - Mat3::IDENTITY;
        for col in [diff.x_axis, diff.y_axis, diff.z_axis] {
            assert!(col.x.abs() < 1e-5 && col.y.abs() < 1e-5 && col.z.abs() < 1e-5);
        }
    }

    #[test]
    fn test_matrix_transforms_origin_to_position() {
        let mut frame = FrameOfReference::from_position(Vec3::new(1.0, -2.0, 3.0));
        frame.rotate(Vec3::Y, 0.7);
        frame.scale = Vec3::new(2.0, 1.0, 0.5);

        let origin = frame.to_matrix4().transform_point3(Vec3::ZERO);
        assert!((origin - frame.position).length() < 1e-5);
    }

    #[test]
    fn test_composition_order() {
        // translate ∘ rotate ∘ scale: a unit-x point scaled by 2, rotated 90
        // degrees about y, then translated.
        let mut frame = FrameOfReference::from_position(Vec3::new(0.0, 0.0, 10.0));
        frame.scale = Vec3::new(2.0, 1.0, 1.0);
        frame.rotate(Vec3::Y, std::f32::consts::FRAC_PI_2);

        let p = frame.to_matrix4().transform_point3(Vec3::X);
        // Scale: (2,0,0); rotate +90 about y: (0,0,-2); translate: (0,0,8).
        assert!((p - Vec3::new(0.0, 0.0, 8.0)).length() < 1e-5, "{p:?}");
    }

    #[test]
    fn test_transform_point_matches_matrix() {
        let mut frame = FrameOfReference::from_position(Vec3::new(4.0, 5.0, 6.0));
        frame.rotate(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.6);
        frame.scale = Vec3::new(1.5, 2.5, 0.5);

        let p = Vec3::new(-1.0, 2.0, 0.25);
        let by_parts = frame.transform_point(p);
        let by_matrix = frame.to_matrix4().transform_point3(p);
        assert!((by_parts - by_matrix).length() < 1e-5);
    }
}
