//! Collision detection: collider variants, broad phase, and narrow phase.
//!
//! Detection runs once per tick:
//!
//! 1. Collider world-space caches are refreshed from each owner's frame.
//! 2. The oct tree is rebuilt and every collidable object inserted by its
//!    world bounds.
//! 3. Each leaf's object list is tested pairwise; a pair already recorded in
//!    another leaf is skipped.
//! 4. Positive tests append a [`Collision`] to the per-tick list and
//!    cross-reference it on both participating colliders.

pub mod collider;
pub mod detect;
pub mod octree;

pub use collider::{Collider, ColliderShape, ConvexHullCollider, HullFace};
pub use detect::{test_pair, Contact};
pub use octree::OctTree;

use std::collections::HashSet;

use glam::Vec3;

use crate::scene::{ObjectId, ScenePool};

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Test whether two boxes overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// The box centre.
    #[inline]
    pub fn centre(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// A detected intersection between two objects.
///
/// The minimum translation vector is unit length and points toward
/// `object_a` by convention. `impulse` is zero until the resolver fills in
/// the magnitude of the collision impulse it applied; the friction and
/// rolling-resistance passes consume it.
#[derive(Debug, Clone, Copy)]
pub struct Collision {
    pub object_a: ObjectId,
    pub object_b: ObjectId,
    pub mtv: Vec3,
    pub overlap: f32,
    pub impulse: f32,
}

/// Per-tick collision state: the broad-phase tree and the collision list.
pub struct CollisionWorld {
    octree: OctTree,
    collisions: Vec<Collision>,
}

impl CollisionWorld {
    /// Create a collision world covering `bounds` with an oct tree of the
    /// given fixed depth.
    pub fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            octree: OctTree::new(bounds, depth),
            collisions: Vec::new(),
        }
    }

    /// The collisions detected this tick.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Mutable access for the resolver to record applied impulses.
    pub fn collisions_mut(&mut self) -> &mut [Collision] {
        &mut self.collisions
    }

    /// Run one full detection pass over the scene.
    ///
    /// Refreshes every collider's world cache, rebuilds the oct tree, runs
    /// the pairwise tests in each leaf, and cross-references results on the
    /// participating colliders. Current-collision lists from the previous
    /// tick are cleared first.
    pub fn detect(&mut self, scene: &mut ScenePool) {
        self.collisions.clear();

        // Refresh caches and clear last tick's cross references.
        for id in scene.ids() {
            if let Some(object) = scene.get_mut(id) {
                let frame = object.frame.clone();
                if let Some(collider) = object.collider.as_mut() {
                    collider.current_collisions.clear();
                    collider.shape.refresh(&frame);
                }
            }
        }

        // Rebuild the tree. Objects without finite bounds (rays) land in
        // every leaf.
        self.octree.clear();
        for id in scene.ids() {
            if let Some(object) = scene.get(id) {
                if let Some(collider) = object.collider.as_ref() {
                    self.octree.insert(id, collider.shape.bounds(&object.frame));
                }
            }
        }

        // Pairwise tests per leaf, with duplicate suppression across leaves.
        let mut tested: HashSet<(ObjectId, ObjectId)> = HashSet::new();
        let mut found: Vec<Collision> = Vec::new();

        self.octree.for_each_leaf(|ids| {
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    let (a, b) = (ids[i], ids[j]);
                    let key = if a < b { (a, b) } else { (b, a) };
                    if !tested.insert(key) {
                        continue;
                    }

                    let (Some(obj_a), Some(obj_b)) = (scene.get(a), scene.get(b)) else {
                        continue;
                    };
                    let (Some(col_a), Some(col_b)) =
                        (obj_a.collider.as_ref(), obj_b.collider.as_ref())
                    else {
                        continue;
                    };

                    if let Some(contact) =
                        test_pair(&col_a.shape, &obj_a.frame, &col_b.shape, &obj_b.frame)
                    {
                        found.push(Collision {
                            object_a: a,
                            object_b: b,
                            mtv: contact.mtv,
                            overlap: contact.overlap,
                            impulse: 0.0,
                        });
                    }
                }
            }
        });

        // Cross-reference on both colliders.
        for (index, collision) in found.iter().enumerate() {
            for id in [collision.object_a, collision.object_b] {
                if let Some(collider) = scene.get_mut(id).and_then(|o| o.collider.as_mut()) {
                    collider.current_collisions.push(index);
                }
            }
        }

        self.collisions = found;
    }
}
