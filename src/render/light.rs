//! Light types consumed by the ray-trace kernels.

use glam::Vec3;

/// Distance attenuation coefficients: `1 / (constant + linear*d + quadratic*d^2)`.
#[derive(Debug, Clone, Copy)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

/// A light with parallel rays.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    /// Direction the light travels (not toward the light).
    pub direction: Vec3,
    pub color: Vec3,
    pub ambient_intensity: f32,
    pub diffuse_intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: Vec3::ONE,
            ambient_intensity: 0.1,
            diffuse_intensity: 1.0,
        }
    }
}

/// A light radiating from a point, attached to a game object.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    /// Offset from the owning object's position.
    pub offset: Vec3,
    pub color: Vec3,
    pub attenuation: Attenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            color: Vec3::ONE,
            attenuation: Attenuation::default(),
        }
    }
}
