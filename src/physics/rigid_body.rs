//! Rigid body state and integration.

use glam::{Mat3, Vec3};

use crate::frame::FrameOfReference;

/// Largest time step a single integration consumes; larger tick deltas are
/// clamped so discrete-step tunnelling stays bounded.
pub const MAX_INTEGRATION_STEP: f32 = 0.003;

/// Mass and velocity state for a simulated body.
///
/// An `inverse_mass` of zero marks the body immovable: it receives no
/// impulses and contributes nothing to impulse denominators. Inertia is kept
/// in object space together with its inverse; world-space forms are derived
/// from the owning frame's rotation on demand.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub inverse_mass: f32,
    /// Moment of inertia tensor in object space.
    pub inertia: Mat3,
    /// Inverse of the object-space inertia tensor.
    pub inverse_inertia: Mat3,
    pub net_force: Vec3,
    pub net_impulse: Vec3,
    pub net_torque: Vec3,
    pub net_instantaneous_torque: Vec3,
    /// Impulse-equivalent of last tick's net force, used as the friction
    /// tangent fallback when the relative velocity is zero.
    pub previous_net_force: Vec3,
    pub previous_net_torque: Vec3,
    pub freeze_translation: bool,
    pub freeze_rotation: bool,
    /// Coefficient of restitution in [0, 1].
    pub restitution: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
    pub rolling_resistance: f32,
    /// Optional linear speed cap.
    pub max_speed: Option<f32>,
}

impl RigidBody {
    /// A dynamic body with the given mass and object-space inertia tensor.
    pub fn dynamic(mass: f32, inertia: Mat3) -> Self {
        Self {
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            inverse_mass: 1.0 / mass,
            inertia,
            inverse_inertia: inertia.inverse(),
            net_force: Vec3::ZERO,
            net_impulse: Vec3::ZERO,
            net_torque: Vec3::ZERO,
            net_instantaneous_torque: Vec3::ZERO,
            previous_net_force: Vec3::ZERO,
            previous_net_torque: Vec3::ZERO,
            freeze_translation: false,
            freeze_rotation: false,
            restitution: 0.2,
            static_friction: 0.6,
            dynamic_friction: 0.4,
            rolling_resistance: 0.0,
            max_speed: None,
        }
    }

    /// An immovable body: infinite mass, no response.
    pub fn immovable() -> Self {
        Self {
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            inverse_mass: 0.0,
            inertia: Mat3::ZERO,
            inverse_inertia: Mat3::ZERO,
            net_force: Vec3::ZERO,
            net_impulse: Vec3::ZERO,
            net_torque: Vec3::ZERO,
            net_instantaneous_torque: Vec3::ZERO,
            previous_net_force: Vec3::ZERO,
            previous_net_torque: Vec3::ZERO,
            freeze_translation: true,
            freeze_rotation: true,
            restitution: 1.0,
            static_friction: 1.0,
            dynamic_friction: 1.0,
            rolling_resistance: 0.0,
            max_speed: None,
        }
    }

    /// Solid sphere inertia tensor: (2/5) m r^2 on the diagonal.
    pub fn sphere_inertia(mass: f32, radius: f32) -> Mat3 {
        Mat3::from_diagonal(Vec3::splat(0.4 * mass * radius * radius))
    }

    /// Solid cuboid inertia tensor from half extents.
    pub fn cuboid_inertia(mass: f32, half: Vec3) -> Mat3 {
        let k = mass / 3.0;
        Mat3::from_diagonal(Vec3::new(
            k * (half.y * half.y + half.z * half.z),
            k * (half.x * half.x + half.z * half.z),
            k * (half.x * half.x + half.y * half.y),
        ))
    }

    #[inline]
    pub fn is_immovable(&self) -> bool {
        self.inverse_mass == 0.0
    }

    /// Accumulate a force applied at an offset from the centre of mass.
    pub fn apply_force(&mut self, force: Vec3, offset: Vec3) {
        self.net_force += force;
        self.net_torque += offset.cross(force);
    }

    /// Accumulate an impulse applied at a radius from the centre of mass.
    /// The angular part is skipped for rotation-frozen bodies.
    pub fn apply_impulse(&mut self, impulse: Vec3, radius: Vec3) {
        self.net_impulse += impulse;
        if !self.freeze_rotation {
            self.net_instantaneous_torque += radius.cross(impulse);
        }
    }

    /// Accumulate an angular impulse.
    pub fn apply_instantaneous_torque(&mut self, torque: Vec3) {
        if !self.freeze_rotation {
            self.net_instantaneous_torque += torque;
        }
    }

    /// Object-space inverse inertia rotated into world space.
    #[inline]
    pub fn world_inverse_inertia(&self, frame: &FrameOfReference) -> Mat3 {
        frame.rotation * self.inverse_inertia * frame.rotation.transpose()
    }

    /// Object-space inertia rotated into world space.
    #[inline]
    pub fn world_inertia(&self, frame: &FrameOfReference) -> Mat3 {
        frame.rotation * self.inertia * frame.rotation.transpose()
    }

    /// Current world-space angular momentum.
    #[inline]
    pub fn angular_momentum(&self, frame: &FrameOfReference) -> Vec3 {
        self.world_inertia(frame) * self.angular_velocity
    }
}

/// Advance one body by `dt` seconds (clamped to [`MAX_INTEGRATION_STEP`]).
///
/// Position uses the current velocity plus the half-acceleration term;
/// velocity then consumes forces and the impulse accumulator. Rotation
/// integrates the angular velocity into an axis-angle step applied to the
/// frame; a zero-length step leaves the prior rotation untouched.
pub fn integrate(frame: &mut FrameOfReference, body: &mut RigidBody, dt: f32) {
    let dt = dt.min(MAX_INTEGRATION_STEP);

    if !body.is_immovable() && !body.freeze_translation {
        let acceleration = body.net_force * body.inverse_mass;
        frame.position += body.linear_velocity * dt + 0.5 * acceleration * dt * dt;
        body.linear_velocity += acceleration * dt + body.net_impulse * body.inverse_mass;
        if let Some(cap) = body.max_speed {
            body.linear_velocity = body.linear_velocity.clamp_length_max(cap);
        }
    }

    if !body.freeze_rotation {
        let inverse_inertia = body.world_inverse_inertia(frame);
        let angular_acceleration = inverse_inertia * body.net_torque;
        body.angular_velocity +=
            angular_acceleration * dt + inverse_inertia * body.net_instantaneous_torque;

        let delta = body.angular_velocity * dt;
        let angle = delta.length();
        if angle > 1e-9 {
            frame.rotate(delta / angle, angle);
        }
    }
}

/// End-of-tick bookkeeping: fold this tick's forces and impulses into the
/// previous-net accumulators and clear the live ones.
pub fn finalize(body: &mut RigidBody, dt: f32) {
    let dt = dt.min(MAX_INTEGRATION_STEP);
    body.previous_net_force = body.net_force * dt + body.net_impulse;
    body.previous_net_torque = body.net_torque * dt + body.net_instantaneous_torque;
    body.net_force = Vec3::ZERO;
    body.net_impulse = Vec3::ZERO;
    body.net_torque = Vec3::ZERO;
    body.net_instantaneous_torque = Vec3::ZERO;
}
