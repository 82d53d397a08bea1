//! Behaviour states attached to game objects.
//!
//! Each game object carries an ordered list of behaviours whose `update`
//! hook runs every tick before detection. Behaviours mutate their object,
//! queue spawns and despawns through the context, and drop themselves by
//! returning `false`.

use glam::Vec3;

use crate::math::Rotor;

use super::{GameObject, TickContext};

/// A per-object update hook. Dispatch is through the trait object; there are
/// no callback fields on the object itself.
pub trait Behaviour {
    /// Advance one tick. Return `false` to remove this behaviour.
    fn update(&mut self, object: &mut GameObject, ctx: &mut TickContext) -> bool;
}

/// Applies a constant force at an offset from the centre of mass each tick.
pub struct ApplyForce {
    pub force: Vec3,
    pub offset: Vec3,
}

impl ApplyForce {
    pub fn new(force: Vec3) -> Self {
        Self {
            force,
            offset: Vec3::ZERO,
        }
    }
}

impl Behaviour for ApplyForce {
    fn update(&mut self, object: &mut GameObject, _ctx: &mut TickContext) -> bool {
        if let Some(body) = object.body.as_mut() {
            body.apply_force(self.force, self.offset);
        }
        true
    }
}

/// Spins the object's frame about an axis at a fixed angular rate.
pub struct Rotate {
    pub axis: Vec3,
    /// Radians per second.
    pub rate: f32,
}

impl Behaviour for Rotate {
    fn update(&mut self, object: &mut GameObject, ctx: &mut TickContext) -> bool {
        object.frame.rotate(self.axis, self.rate * ctx.delta);
        true
    }
}

/// Revolves the object's position around a centre point using an
/// incrementally composed rotor, renormalized each step so long revolutions
/// do not drift.
pub struct RotorSpin {
    pub centre: Vec3,
    pub axis: Vec3,
    /// Radians per second.
    pub rate: f32,
    accumulated: Rotor,
    start_offset: Option<Vec3>,
}

impl RotorSpin {
    pub fn new(centre: Vec3, axis: Vec3, rate: f32) -> Self {
        Self {
            centre,
            axis,
            rate,
            accumulated: Rotor::from_axis_angle(axis, 0.0),
            start_offset: None,
        }
    }
}

impl Behaviour for RotorSpin {
    fn update(&mut self, object: &mut GameObject, ctx: &mut TickContext) -> bool {
        let offset = *self
            .start_offset
            .get_or_insert(object.frame.position - self.centre);
        let step = Rotor::from_axis_angle(self.axis, self.rate * ctx.delta);
        self.accumulated = step.compose(&self.accumulated).normalized();
        object.frame.position = self.centre + self.accumulated.rotate(offset);
        true
    }
}

/// Despawns the owning object after a delay.
pub struct Remove {
    pub remaining: f32,
}

impl Remove {
    pub fn after(seconds: f32) -> Self {
        Self { remaining: seconds }
    }
}

impl Behaviour for Remove {
    fn update(&mut self, _object: &mut GameObject, ctx: &mut TickContext) -> bool {
        self.remaining -= ctx.delta;
        if self.remaining <= 0.0 {
            let id = ctx.id;
            ctx.despawn(id);
            return false;
        }
        true
    }
}

/// Teleports the object back to a saved pose once it strays beyond a bound,
/// zeroing its velocities.
pub struct Reset {
    pub home: Vec3,
    pub bound: f32,
}

impl Behaviour for Reset {
    fn update(&mut self, object: &mut GameObject, _ctx: &mut TickContext) -> bool {
        if (object.frame.position - self.home).length() > self.bound {
            object.frame.position = self.home;
            if let Some(body) = object.body.as_mut() {
                body.linear_velocity = Vec3::ZERO;
                body.angular_velocity = Vec3::ZERO;
            }
        }
        true
    }
}
