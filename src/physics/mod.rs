//! Rigid body simulation: integration and impulse-based collision response.
//!
//! The physics pipeline runs once per tick:
//!
//! 1. Gravity and behaviour forces accumulate on each body
//! 2. Detection produces the per-tick collision list
//! 3. The resolver decouples pairs and applies collision, friction, and
//!    rolling-resistance impulses
//! 4. Integration consumes the accumulators and advances every frame

pub mod resolver;
pub mod rigid_body;

pub use resolver::resolve;
pub use rigid_body::{finalize, integrate, RigidBody, MAX_INTEGRATION_STEP};

use glam::Vec3;

use crate::scene::ScenePool;

/// Configuration for the physics simulation.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity acceleration. Default: (0, -9.81, 0).
    pub gravity: Vec3,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

/// Accumulate the global gravity force on every movable body.
pub fn apply_gravity(scene: &mut ScenePool, gravity: Vec3) {
    for id in scene.ids() {
        if let Some(body) = scene.get_mut(id).and_then(|o| o.body.as_mut()) {
            if !body.is_immovable() {
                body.apply_force(gravity / body.inverse_mass, Vec3::ZERO);
            }
        }
    }
}

/// Integrate every body in the scene by `dt`, then fold and clear its
/// accumulators.
pub fn integrate_scene(scene: &mut ScenePool, dt: f32) {
    for id in scene.ids() {
        if let Some(object) = scene.get_mut(id) {
            if let Some(body) = object.body.as_mut() {
                rigid_body::integrate(&mut object.frame, body, dt);
                rigid_body::finalize(body, dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameOfReference;
    use crate::scene::GameObject;

    #[test]
    fn test_gravity_scales_with_mass() {
        let mut scene = ScenePool::new();
        let mut object = GameObject::new(FrameOfReference::identity());
        object.body = Some(RigidBody::dynamic(3.0, RigidBody::sphere_inertia(3.0, 1.0)));
        let id = scene.spawn(object);

        apply_gravity(&mut scene, Vec3::new(0.0, -9.81, 0.0));
        let body = scene.get(id).unwrap().body.as_ref().unwrap();
        assert!((body.net_force - Vec3::new(0.0, -29.43, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_immovable_receives_no_gravity() {
        let mut scene = ScenePool::new();
        let mut object = GameObject::new(FrameOfReference::identity());
        object.body = Some(RigidBody::immovable());
        let id = scene.spawn(object);

        apply_gravity(&mut scene, Vec3::new(0.0, -9.81, 0.0));
        let body = scene.get(id).unwrap().body.as_ref().unwrap();
        assert_eq!(body.net_force, Vec3::ZERO);
    }
}
