//! Scene management: pooled game objects with stable ids and two-phase
//! deletion.
//!
//! Objects live in a memory pool that hands out `ObjectId`s (index plus
//! generation). Lookups of retired ids return `None`, so references threaded
//! through collision records cannot be used after deletion. Deletion is
//! two-phase: behaviours queue removals, and the queue is swept between
//! detection and the next integrator step so in-flight collision records
//! stay valid for the rest of the tick.

pub mod behaviour;

pub use behaviour::{ApplyForce, Behaviour, Remove, Reset, Rotate, RotorSpin};

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assets::{MaterialId, MeshId};
use crate::collision::{Collider, Collision};
use crate::frame::FrameOfReference;
use crate::physics::RigidBody;
use crate::render::PointLight;

/// Stable handle to a pooled game object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

/// An entity: a frame of reference plus optional components.
///
/// Dropping a game object drops its components in declaration order; there
/// is no per-variant free path.
pub struct GameObject {
    pub frame: FrameOfReference,
    pub mesh: Option<MeshId>,
    pub material: Option<MaterialId>,
    pub body: Option<RigidBody>,
    pub collider: Option<Collider>,
    pub light: Option<PointLight>,
    pub behaviours: Vec<Box<dyn Behaviour>>,
}

impl GameObject {
    /// A bare object with the given frame and no components.
    pub fn new(frame: FrameOfReference) -> Self {
        Self {
            frame,
            mesh: None,
            material: None,
            body: None,
            collider: None,
            light: None,
            behaviours: Vec::new(),
        }
    }
}

/// Process-wide simulation state, threaded explicitly through the tick
/// instead of living in globals.
pub struct Globals {
    /// Cleared to stop the engine loop between ticks.
    pub running: bool,
    /// Seconds covered by the current tick.
    pub delta: f32,
    /// Global acceleration applied to every dynamic body.
    pub gravity: Vec3,
    /// Shared random source for behaviours.
    pub rng: StdRng,
}

impl Globals {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Deterministic globals for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            running: true,
            delta: 0.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for Globals {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-behaviour update context: tick state plus the spawn/despawn queues.
pub struct TickContext<'a> {
    /// The id of the object whose behaviour is running.
    pub id: ObjectId,
    pub delta: f32,
    pub gravity: Vec3,
    pub rng: &'a mut StdRng,
    /// The collisions detected last tick.
    pub collisions: &'a [Collision],
    spawns: &'a mut Vec<GameObject>,
    despawns: &'a mut Vec<ObjectId>,
}

impl TickContext<'_> {
    /// Queue a new object; it joins the pool after detection.
    pub fn spawn(&mut self, object: GameObject) {
        self.spawns.push(object);
    }

    /// Queue an object for removal at the end-of-tick sweep.
    pub fn despawn(&mut self, id: ObjectId) {
        self.despawns.push(id);
    }
}

struct Slot {
    generation: u32,
    object: Option<GameObject>,
}

/// The memory-pooled collection of live game objects.
#[derive(Default)]
pub struct ScenePool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    add_queue: Vec<GameObject>,
    delete_queue: Vec<ObjectId>,
}

impl ScenePool {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            add_queue: Vec::new(),
            delete_queue: Vec::new(),
        }
    }

    /// Add an object immediately, reusing a retired slot when available.
    pub fn spawn(&mut self, object: GameObject) -> ObjectId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(object);
                ObjectId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    object: Some(object),
                });
                ObjectId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Queue an object for addition at the next sweep.
    pub fn queue_spawn(&mut self, object: GameObject) {
        self.add_queue.push(object);
    }

    /// Queue an object for removal at the next sweep.
    pub fn queue_despawn(&mut self, id: ObjectId) {
        self.delete_queue.push(id);
    }

    /// Sweep the delete queue, then the add queue. Runs after detection and
    /// before the next integrator step.
    pub fn apply_queues(&mut self) {
        let deletes = std::mem::take(&mut self.delete_queue);
        for id in deletes {
            self.remove(id);
        }
        let adds = std::mem::take(&mut self.add_queue);
        for object in adds {
            self.spawn(object);
        }
    }

    fn remove(&mut self, id: ObjectId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            if slot.generation == id.generation && slot.object.is_some() {
                slot.object = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
    }

    /// Look up a live object; retired ids return `None`.
    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_ref()
    }

    /// Mutable lookup; retired ids return `None`.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_mut()
    }

    /// Simultaneous mutable access to two distinct objects, for the
    /// resolver.
    pub fn get_pair_mut(
        &mut self,
        a: ObjectId,
        b: ObjectId,
    ) -> Option<(&mut GameObject, &mut GameObject)> {
        if a.index == b.index {
            return None;
        }
        let (lo, hi, swap) = if a.index < b.index {
            (a, b, false)
        } else {
            (b, a, true)
        };
        if hi.index as usize >= self.slots.len() {
            return None;
        }
        let (head, tail) = self.slots.split_at_mut(hi.index as usize);
        let lo_slot = head.get_mut(lo.index as usize)?;
        let hi_slot = tail.first_mut()?;
        if lo_slot.generation != lo.generation || hi_slot.generation != hi.generation {
            return None;
        }
        let lo_obj = lo_slot.object.as_mut()?;
        let hi_obj = hi_slot.object.as_mut()?;
        if swap {
            Some((hi_obj, lo_obj))
        } else {
            Some((lo_obj, hi_obj))
        }
    }

    /// The ids of all live objects.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.object.is_some())
            .map(|(index, slot)| ObjectId {
                index: index as u32,
                generation: slot.generation,
            })
            .collect()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.object.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every live object's ordered behaviour states.
    ///
    /// Behaviours see last tick's collision list and append to the
    /// spawn/despawn queues; a behaviour returning `false` from its update is
    /// dropped afterward.
    pub fn update(&mut self, globals: &mut Globals, collisions: &[Collision]) {
        let ids = self.ids();
        let mut spawns = Vec::new();
        let mut despawns = Vec::new();

        for id in ids {
            let Some(object) = self.get_mut(id) else {
                continue;
            };
            let mut behaviours = std::mem::take(&mut object.behaviours);
            let mut keep = Vec::with_capacity(behaviours.len());

            for behaviour in behaviours.iter_mut() {
                let Some(object) = self.get_mut(id) else {
                    break;
                };
                let mut ctx = TickContext {
                    id,
                    delta: globals.delta,
                    gravity: globals.gravity,
                    rng: &mut globals.rng,
                    collisions,
                    spawns: &mut spawns,
                    despawns: &mut despawns,
                };
                keep.push(behaviour.update(object, &mut ctx));
            }

            if let Some(object) = self.get_mut(id) {
                let mut kept: Vec<Box<dyn Behaviour>> = behaviours
                    .into_iter()
                    .zip(keep)
                    .filter_map(|(b, k)| k.then_some(b))
                    .collect();
                // Behaviours pushed during the update run next tick.
                kept.append(&mut object.behaviours);
                object.behaviours = kept;
            }
        }

        self.add_queue.append(&mut spawns);
        self.delete_queue.append(&mut despawns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retired_id_returns_none() {
        let mut pool = ScenePool::new();
        let id = pool.spawn(GameObject::new(FrameOfReference::identity()));
        assert!(pool.get(id).is_some());

        pool.queue_despawn(id);
        // Still valid before the sweep.
        assert!(pool.get(id).is_some());

        pool.apply_queues();
        assert!(pool.get(id).is_none());
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut pool = ScenePool::new();
        let first = pool.spawn(GameObject::new(FrameOfReference::identity()));
        pool.queue_despawn(first);
        pool.apply_queues();

        let second = pool.spawn(GameObject::new(FrameOfReference::identity()));
        assert_ne!(first, second);
        assert!(pool.get(first).is_none());
        assert!(pool.get(second).is_some());
    }

    #[test]
    fn test_get_pair_mut_disjoint() {
        let mut pool = ScenePool::new();
        let a = pool.spawn(GameObject::new(FrameOfReference::from_position(Vec3::X)));
        let b = pool.spawn(GameObject::new(FrameOfReference::from_position(Vec3::Y)));

        let (obj_a, obj_b) = pool.get_pair_mut(a, b).unwrap();
        assert!((obj_a.frame.position - Vec3::X).length() < 1e-6);
        assert!((obj_b.frame.position - Vec3::Y).length() < 1e-6);

        // Order is preserved regardless of slot layout.
        let (obj_b2, obj_a2) = pool.get_pair_mut(b, a).unwrap();
        assert!((obj_b2.frame.position - Vec3::Y).length() < 1e-6);
        assert!((obj_a2.frame.position - Vec3::X).length() < 1e-6);

        assert!(pool.get_pair_mut(a, a).is_none());
    }

    #[test]
    fn test_behaviour_spawns_and_despawns() {
        struct SpawnOnce;
        impl Behaviour for SpawnOnce {
            fn update(&mut self, _object: &mut GameObject, ctx: &mut TickContext) -> bool {
                ctx.spawn(GameObject::new(FrameOfReference::identity()));
                let id = ctx.id;
                ctx.despawn(id);
                false
            }
        }

        let mut pool = ScenePool::new();
        let mut object = GameObject::new(FrameOfReference::identity());
        object.behaviours.push(Box::new(SpawnOnce));
        let id = pool.spawn(object);

        let mut globals = Globals::with_seed(1);
        pool.update(&mut globals, &[]);
        // Queues are not applied mid-tick.
        assert!(pool.get(id).is_some());

        pool.apply_queues();
        assert!(pool.get(id).is_none());
        assert_eq!(pool.len(), 1);
    }
}
