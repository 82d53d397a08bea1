//! Fixed-depth oct tree broad phase.
//!
//! The tree subdivides the world bounds to a fixed depth up front; leaves
//! carry object-id lists. Objects are re-inserted every tick, landing in
//! every leaf their bounds overlap, so cross-leaf duplicates are possible
//! and the detection pass deduplicates pairs.

use crate::scene::ObjectId;

use super::Aabb;

struct Node {
    bounds: Aabb,
    children: Option<Box<[Node; 8]>>,
    objects: Vec<ObjectId>,
}

impl Node {
    fn new(bounds: Aabb, depth: u32) -> Self {
        let children = if depth == 0 {
            None
        } else {
            let c = bounds.centre();
            let (min, max) = (bounds.min, bounds.max);
            let child = |i: usize| {
                let child_min = glam::Vec3::new(
                    if i & 1 == 0 { min.x } else { c.x },
                    if i & 2 == 0 { min.y } else { c.y },
                    if i & 4 == 0 { min.z } else { c.z },
                );
                let child_max = glam::Vec3::new(
                    if i & 1 == 0 { c.x } else { max.x },
                    if i & 2 == 0 { c.y } else { max.y },
                    if i & 4 == 0 { c.z } else { max.z },
                );
                Node::new(
                    Aabb {
                        min: child_min,
                        max: child_max,
                    },
                    depth - 1,
                )
            };
            Some(Box::new([
                child(0),
                child(1),
                child(2),
                child(3),
                child(4),
                child(5),
                child(6),
                child(7),
            ]))
        };
        Self {
            bounds,
            children,
            objects: Vec::new(),
        }
    }

    fn clear(&mut self) {
        self.objects.clear();
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                child.clear();
            }
        }
    }

    fn insert(&mut self, id: ObjectId, bounds: Option<&Aabb>) {
        match self.children.as_mut() {
            None => self.objects.push(id),
            Some(children) => {
                for child in children.iter_mut() {
                    let overlaps = bounds.map_or(true, |b| child.bounds.overlaps(b));
                    if overlaps {
                        child.insert(id, bounds);
                    }
                }
            }
        }
    }

    fn for_each_leaf(&self, f: &mut impl FnMut(&[ObjectId])) {
        match self.children.as_ref() {
            None => {
                if self.objects.len() > 1 {
                    f(&self.objects);
                }
            }
            Some(children) => {
                for child in children.iter() {
                    child.for_each_leaf(f);
                }
            }
        }
    }
}

/// Broad-phase spatial index over the world bounds.
pub struct OctTree {
    root: Node,
}

impl OctTree {
    /// Build a tree over `bounds`, pre-subdivided to `depth` levels.
    pub fn new(bounds: Aabb, depth: u32) -> Self {
        Self {
            root: Node::new(bounds, depth),
        }
    }

    /// Remove all objects, keeping the node structure.
    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// Insert an object into every leaf its bounds overlap. `None` bounds
    /// (rays) insert into every leaf.
    pub fn insert(&mut self, id: ObjectId, bounds: Option<Aabb>) {
        self.root.insert(id, bounds.as_ref());
    }

    /// Visit every leaf holding at least two objects.
    pub fn for_each_leaf(&self, mut f: impl FnMut(&[ObjectId])) {
        self.root.for_each_leaf(&mut f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameOfReference;
    use crate::scene::{GameObject, ScenePool};
    use glam::Vec3;
    use std::collections::HashSet;

    fn bounds(centre: Vec3, half: f32) -> Aabb {
        Aabb {
            min: centre - Vec3::splat(half),
            max: centre + Vec3::splat(half),
        }
    }

    fn world_bounds() -> Aabb {
        bounds(Vec3::ZERO, 32.0)
    }

    #[test]
    fn test_pairs_match_brute_force() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);
        let mut scene = ScenePool::new();
        let mut entries = Vec::new();
        for _ in 0..40 {
            let centre = Vec3::new(
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
            );
            let half = rng.gen_range(0.5..4.0);
            let id = scene.spawn(GameObject::new(FrameOfReference::from_position(centre)));
            entries.push((id, bounds(centre, half)));
        }

        let mut tree = OctTree::new(world_bounds(), 3);
        for (id, b) in &entries {
            tree.insert(*id, Some(*b));
        }

        // Collect tree candidate pairs (deduplicated).
        let mut tree_pairs = HashSet::new();
        tree.for_each_leaf(|ids| {
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    let (a, b) = (ids[i], ids[j]);
                    let key = if a < b { (a, b) } else { (b, a) };
                    tree_pairs.insert(key);
                }
            }
        });

        // Every truly overlapping pair must be among the candidates.
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                let (ida, ba) = &entries[i];
                let (idb, bb) = &entries[j];
                if ba.overlaps(bb) {
                    let key = if ida < idb { (*ida, *idb) } else { (*idb, *ida) };
                    assert!(
                        tree_pairs.contains(&key),
                        "missing candidate pair {ida:?} {idb:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_unbounded_object_reaches_all_leaves() {
        let mut scene = ScenePool::new();
        let ray = scene.spawn(GameObject::new(FrameOfReference::identity()));
        let sphere = scene.spawn(GameObject::new(FrameOfReference::from_position(Vec3::new(
            30.0, 30.0, 30.0,
        ))));

        let mut tree = OctTree::new(world_bounds(), 2);
        tree.insert(ray, None);
        tree.insert(sphere, Some(bounds(Vec3::new(30.0, 30.0, 30.0), 1.0)));

        let mut met = false;
        tree.for_each_leaf(|ids| {
            if ids.contains(&ray) && ids.contains(&sphere) {
                met = true;
            }
        });
        assert!(met, "ray never shared a leaf with the far object");
    }

    #[test]
    fn test_clear_keeps_structure() {
        let mut scene = ScenePool::new();
        let id = scene.spawn(GameObject::new(FrameOfReference::identity()));

        let mut tree = OctTree::new(world_bounds(), 2);
        tree.insert(id, Some(bounds(Vec3::ZERO, 1.0)));
        tree.clear();

        let mut any = false;
        tree.for_each_leaf(|_| any = true);
        assert!(!any);
    }
}
