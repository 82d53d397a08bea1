//! Impulse-based collision resolution.
//!
//! For each collision the resolver:
//!
//! 1. Decouples the penetrating pair along the MTV
//! 2. Determines the contact point on each body
//! 3. Applies the collision impulse with restitution
//! 4. Applies linear friction, angular friction, and rolling resistance
//!
//! Impulses land in the body accumulators and are consumed by the
//! integrator. The resolver is fail-closed: a degenerate impulse denominator
//! skips the impulse for that pair while decoupling still runs.

use glam::Vec3;

use crate::collision::collider::{AabbCollider, ColliderShape, ConvexHullCollider};
use crate::collision::Collision;
use crate::frame::FrameOfReference;
use crate::math::{orthonormal_basis, project, reject};
use crate::scene::{GameObject, ScenePool};

use super::rigid_body::RigidBody;

const EPSILON: f32 = f32::EPSILON;

/// Resolve every collision in the per-tick list, recording the applied
/// impulse magnitudes back into the records.
pub fn resolve(scene: &mut ScenePool, collisions: &mut [Collision]) {
    for collision in collisions.iter_mut() {
        let Some((obj1, obj2)) = scene.get_pair_mut(collision.object_a, collision.object_b) else {
            continue;
        };
        resolve_collision(obj1, obj2, collision);
    }
}

fn resolve_collision(obj1: &mut GameObject, obj2: &mut GameObject, collision: &mut Collision) {
    // Ray collisions are query results, not physical contacts.
    let is_ray = |o: &GameObject| {
        matches!(
            o.collider.as_ref().map(|c| &c.shape),
            Some(ColliderShape::Ray(_))
        )
    };
    if is_ray(obj1) || is_ray(obj2) {
        return;
    }

    decouple(obj1, obj2, collision);

    let (point1, point2) = contact_points(obj1, obj2, collision.mtv);

    if !resolution_needed(obj1, obj2, collision) {
        return;
    }

    apply_collision_impulse(obj1, obj2, collision, point1, point2);

    let static_friction = average(obj1, obj2, |b| b.static_friction, 1.0);
    let dynamic_friction = average(obj1, obj2, |b| b.dynamic_friction, 1.0);
    apply_linear_friction(
        obj1,
        obj2,
        collision,
        static_friction,
        dynamic_friction,
        point1,
        point2,
    );
    apply_angular_friction(obj1, obj2, collision, static_friction, dynamic_friction);

    let rolling = average(obj1, obj2, |b| b.rolling_resistance, 0.0);
    apply_rolling_resistance(obj1, obj2, collision, point1, point2, rolling);
}

/// Average a coefficient over the pair, substituting `default` for a
/// missing body.
fn average(
    obj1: &GameObject,
    obj2: &GameObject,
    f: impl Fn(&RigidBody) -> f32,
    default: f32,
) -> f32 {
    let a = obj1.body.as_ref().map(&f).unwrap_or(default);
    let b = obj2.body.as_ref().map(&f).unwrap_or(default);
    0.5 * (a + b)
}

/// Translate the pair out of penetration along the MTV.
///
/// Each movable body contributes a share proportional to its speed along the
/// MTV; when neither body is moving along the MTV nothing is decoupled.
fn decouple(obj1: &mut GameObject, obj2: &mut GameObject, collision: &Collision) {
    if collision.overlap <= EPSILON {
        return;
    }

    let movable = |body: &Option<RigidBody>| {
        body.as_ref()
            .map(|b| !b.is_immovable() && !b.freeze_translation)
            .unwrap_or(false)
    };

    let speed1 = if movable(&obj1.body) {
        obj1.body
            .as_ref()
            .map(|b| b.linear_velocity.dot(collision.mtv).abs())
            .unwrap_or(0.0)
    } else {
        0.0
    };
    let speed2 = if movable(&obj2.body) {
        obj2.body
            .as_ref()
            .map(|b| b.linear_velocity.dot(collision.mtv).abs())
            .unwrap_or(0.0)
    } else {
        0.0
    };

    let total = speed1 + speed2;
    if total == 0.0 {
        return;
    }

    // The MTV points toward object 1: move it along, object 2 against.
    if movable(&obj1.body) {
        obj1.frame
            .translate(collision.mtv * (collision.overlap * speed1 / total));
    }
    if movable(&obj2.body) {
        obj2.frame
            .translate(-collision.mtv * (collision.overlap * speed2 / total));
    }
}

/// Whether the pair is still approaching along the contact normal.
fn resolution_needed(obj1: &GameObject, obj2: &GameObject, collision: &Collision) -> bool {
    if collision.overlap.abs() <= EPSILON {
        return false;
    }
    let v1 = obj1
        .body
        .as_ref()
        .map(|b| b.linear_velocity)
        .unwrap_or(Vec3::ZERO);
    let v2 = obj2
        .body
        .as_ref()
        .map(|b| b.linear_velocity)
        .unwrap_or(Vec3::ZERO);
    // Object 2 moving along the MTV is moving toward object 1.
    (v2 - v1).dot(collision.mtv) > 0.0
}

/// The contact point on each body.
///
/// Spheres contact at the radius along the MTV toward the other body and
/// share that point with any non-AABB partner. AABBs contact at their centre
/// of mass, which zeroes the torque arm and keeps boxes from spinning up out
/// of discrete-step corner contacts. Hulls use the furthest-vertex subsets.
fn contact_points(obj1: &GameObject, obj2: &GameObject, mtv: Vec3) -> (Vec3, Vec3) {
    let shape1 = obj1.collider.as_ref().map(|c| &c.shape);
    let shape2 = obj2.collider.as_ref().map(|c| &c.shape);

    let mut point1: Option<Vec3> = None;
    let mut point2: Option<Vec3> = None;

    // Sphere cases first; they are exact and may be shared.
    if let Some(ColliderShape::Sphere(sphere)) = shape2 {
        // The MTV points toward object 1, which is the "other" body here.
        let p = sphere.world_centre + mtv * sphere.world_radius;
        point2 = Some(p);
        if !matches!(shape1, Some(ColliderShape::Aabb(_))) {
            point1 = Some(p);
        }
    } else if let Some(ColliderShape::Sphere(sphere)) = shape1 {
        let p = sphere.world_centre - mtv * sphere.world_radius;
        point1 = Some(p);
        if !matches!(shape2, Some(ColliderShape::Aabb(_))) {
            point2 = Some(p);
        }
    }

    if matches!(shape1, Some(ColliderShape::Aabb(_))) {
        point1 = Some(obj1.frame.position);
    }
    if matches!(shape2, Some(ColliderShape::Aabb(_))) {
        point2 = Some(obj2.frame.position);
    }

    match (point1, point2) {
        (Some(p1), Some(p2)) => (p1, p2),
        (Some(p1), None) => {
            // Object 2 is a hull against an AABB.
            let p2 = match (shape1, shape2) {
                (Some(ColliderShape::Aabb(aabb)), Some(ColliderShape::ConvexHull(hull))) => {
                    let synthesized = aabb_as_hull(aabb, obj1.frame.position);
                    hull_contact_point(hull, &obj2.frame, &synthesized, &obj1.frame, mtv)
                }
                _ => p1,
            };
            (p1, p2)
        }
        (None, Some(p2)) => {
            // Object 1 is a hull against an AABB.
            let p1 = match (shape1, shape2) {
                (Some(ColliderShape::ConvexHull(hull)), Some(ColliderShape::Aabb(aabb))) => {
                    let synthesized = aabb_as_hull(aabb, obj2.frame.position);
                    hull_contact_point(hull, &obj1.frame, &synthesized, &obj2.frame, -mtv)
                }
                _ => p2,
            };
            (p1, p2)
        }
        (None, None) => {
            // Hull-hull: both bodies share the point computed on object 2.
            let p = match (shape1, shape2) {
                (Some(ColliderShape::ConvexHull(h1)), Some(ColliderShape::ConvexHull(h2))) => {
                    hull_contact_point(h2, &obj2.frame, h1, &obj1.frame, mtv)
                }
                // No colliders at all; fall back to the segment midpoint.
                _ => 0.5 * (obj1.frame.position + obj2.frame.position),
            };
            (p, p)
        }
    }
}

/// Synthesize a hull from a world-space AABB cache so the hull contact
/// routine can treat mixed pairs uniformly. The cached vertices are offsets
/// from the owning frame's position, like any refreshed hull.
fn aabb_as_hull(aabb: &AabbCollider, position: Vec3) -> ConvexHullCollider {
    let half = 0.5 * (aabb.world.max - aabb.world.min);
    let offset = aabb.world.centre() - position;
    let mut hull = ConvexHullCollider::cuboid(half);
    let world_vertices: Vec<Vec3> = hull.vertices.iter().map(|v| *v + offset).collect();
    let world_normals: Vec<Vec3> = hull.faces.iter().map(|f| f.normal).collect();
    hull.world_vertices = world_vertices;
    hull.world_normals = world_normals;
    hull.world_edges = vec![Vec3::X, Vec3::Y, Vec3::Z];
    hull
}

/// Contact point on `hull` for a hull-involved pair.
///
/// `mtv_toward_other` points from `hull` toward the partner. Single-vertex
/// subsets are exact; two-vertex subsets on both sides solve the edge-edge
/// line system; anything else projects both subsets onto the contact plane
/// and takes the midpoints of the overlap intervals.
fn hull_contact_point(
    hull: &ConvexHullCollider,
    frame: &FrameOfReference,
    other: &ConvexHullCollider,
    other_frame: &FrameOfReference,
    mtv_toward_other: Vec3,
) -> Vec3 {
    let subset = hull.furthest_vertices(mtv_toward_other);
    if subset.len() == 1 {
        return subset[0] + frame.position;
    }

    let other_subset = other.furthest_vertices(-mtv_toward_other);
    if other_subset.len() == 1 {
        return other_subset[0] + other_frame.position;
    }

    if subset.len() == 2 && other_subset.len() == 2 {
        // Edge-edge: solve offset1 + t*dir1 = offset2 + t*dir2 on the first
        // non-degenerate component.
        let dir1 = subset[1] - subset[0];
        let dir2 = other_subset[1] - other_subset[0];
        let offset1 = frame.position + subset[0];
        let offset2 = other_frame.position + other_subset[0];

        let offset = offset1 - offset2;
        let direction = dir2 - dir1;
        let mut t = 0.0;
        for i in 0..3 {
            if direction[i].abs() > EPSILON {
                t = offset[i] / direction[i];
                break;
            }
        }
        return offset1 + dir1 * t;
    }

    // Edge/face - face: overlap midpoints in the contact plane plus the
    // along-normal offset of the face.
    let world1: Vec<Vec3> = subset.iter().map(|v| *v + frame.position).collect();
    let world2: Vec<Vec3> = other_subset
        .iter()
        .map(|v| *v + other_frame.position)
        .collect();

    let (x_axis, y_axis) = orthonormal_basis(mtv_toward_other);
    let mut point = Vec3::ZERO;
    for axis in [x_axis, y_axis] {
        let (min1, max1) = bounds_on_axis(&world1, axis);
        let (min2, max2) = bounds_on_axis(&world2, axis);
        let lower_mid = min1.max(min2);
        let upper_mid = max1.min(max2);
        point += axis * (lower_mid + 0.5 * (upper_mid - lower_mid));
    }
    point + mtv_toward_other * world1[0].dot(mtv_toward_other)
}

fn bounds_on_axis(points: &[Vec3], axis: Vec3) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for p in points {
        let d = p.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Chris Hecker's collision impulse with restitution.
fn apply_collision_impulse(
    obj1: &mut GameObject,
    obj2: &mut GameObject,
    collision: &mut Collision,
    point1: Vec3,
    point2: Vec3,
) {
    let n = collision.mtv;
    let restitution = obj1.body.as_ref().map(|b| b.restitution).unwrap_or(1.0)
        * obj2.body.as_ref().map(|b| b.restitution).unwrap_or(1.0);

    let radius1 = point1 - obj1.frame.position;
    let radius2 = point2 - obj2.frame.position;

    let velocity_at = |body: &Option<RigidBody>, radius: Vec3| {
        body.as_ref()
            .map(|b| b.linear_velocity + b.angular_velocity.cross(radius))
            .unwrap_or(Vec3::ZERO)
    };
    // Relative velocity of object 1's contact observed from object 2's.
    let relative = velocity_at(&obj1.body, radius1) - velocity_at(&obj2.body, radius2);
    let numerator = (-1.0 - restitution) * relative.dot(n);

    let angular_term = |body: &Option<RigidBody>, frame: &FrameOfReference, radius: Vec3| {
        body.as_ref()
            .filter(|b| !b.is_immovable())
            .map(|b| {
                let alpha = b.world_inverse_inertia(frame) * radius.cross(n);
                alpha.cross(radius)
            })
            .unwrap_or(Vec3::ZERO)
    };

    let inverse_mass_sum = obj1.body.as_ref().map(|b| b.inverse_mass).unwrap_or(0.0)
        + obj2.body.as_ref().map(|b| b.inverse_mass).unwrap_or(0.0);
    let denominator = inverse_mass_sum
        + (angular_term(&obj1.body, &obj1.frame, radius1)
            + angular_term(&obj2.body, &obj2.frame, radius2))
        .dot(n);

    // Fail closed on an ill-conditioned denominator.
    if denominator <= EPSILON {
        return;
    }

    let impulse = numerator / denominator;
    collision.impulse = impulse.abs();

    if let Some(body) = obj1.body.as_mut().filter(|b| !b.is_immovable()) {
        body.apply_impulse(n * impulse, radius1);
    }
    if let Some(body) = obj2.body.as_mut().filter(|b| !b.is_immovable()) {
        body.apply_impulse(-n * impulse, radius2);
    }
}

/// Coulomb friction against sliding at the contact.
fn apply_linear_friction(
    obj1: &mut GameObject,
    obj2: &mut GameObject,
    collision: &Collision,
    static_coefficient: f32,
    dynamic_coefficient: f32,
    point1: Vec3,
    point2: Vec3,
) {
    let n = collision.mtv;
    let radius1 = point1 - obj1.frame.position;
    let radius2 = point2 - obj2.frame.position;

    // Relative velocity of object 2's contact observed from object 1's.
    let velocity_at = |body: &Option<RigidBody>, radius: Vec3| {
        body.as_ref()
            .map(|b| b.linear_velocity + b.angular_velocity.cross(radius))
            .unwrap_or(Vec3::ZERO)
    };
    let relative = velocity_at(&obj2.body, radius2) - velocity_at(&obj1.body, radius1);

    // Tangent along the sliding direction; when the pair is not sliding the
    // relative previous-tick net force picks the direction instead.
    let mut tangent = reject(relative, n);
    if tangent.length() <= EPSILON {
        let force1 = obj1
            .body
            .as_ref()
            .map(|b| b.previous_net_force)
            .unwrap_or(Vec3::ZERO);
        let force2 = obj2
            .body
            .as_ref()
            .map(|b| b.previous_net_force)
            .unwrap_or(Vec3::ZERO);
        tangent = reject(force2 - force1, n);
    }
    let tangent_length = tangent.length();
    if tangent_length <= EPSILON {
        return;
    }
    let tangent = tangent / tangent_length;

    let static_magnitude = static_coefficient * collision.impulse;
    let dynamic_magnitude = dynamic_coefficient * collision.impulse;
    let sliding_speed = relative.dot(tangent);

    if let Some(body) = obj1
        .body
        .as_mut()
        .filter(|b| !b.is_immovable() && !b.freeze_translation)
    {
        let required = sliding_speed / body.inverse_mass;
        let radius = if body.freeze_rotation {
            Vec3::ZERO
        } else {
            radius1
        };
        let impulse = if required <= static_magnitude {
            tangent * required
        } else {
            tangent * dynamic_magnitude
        };
        body.apply_impulse(impulse, radius);
    }

    if let Some(body) = obj2
        .body
        .as_mut()
        .filter(|b| !b.is_immovable() && !b.freeze_translation)
    {
        let required = sliding_speed / body.inverse_mass;
        let radius = if body.freeze_rotation {
            Vec3::ZERO
        } else {
            radius2
        };
        let impulse = if required <= static_magnitude {
            -tangent * required
        } else {
            -tangent * dynamic_magnitude
        };
        body.apply_impulse(impulse, radius);
    }
}

/// Friction against relative spin about the contact normal.
fn apply_angular_friction(
    obj1: &mut GameObject,
    obj2: &mut GameObject,
    collision: &Collision,
    static_coefficient: f32,
    dynamic_coefficient: f32,
) {
    let n = collision.mtv;

    let spinning = |o: &GameObject| {
        o.body
            .as_ref()
            .filter(|b| !b.is_immovable() && !b.freeze_rotation)
            .map(|b| b.angular_velocity)
    };
    let relative_spin =
        spinning(obj2).unwrap_or(Vec3::ZERO) - spinning(obj1).unwrap_or(Vec3::ZERO);
    let spin_along_normal = relative_spin.dot(n);

    let static_magnitude = static_coefficient * collision.impulse;
    let dynamic_magnitude = dynamic_coefficient * collision.impulse;

    let frame1 = obj1.frame.clone();
    if let Some(body) = obj1
        .body
        .as_mut()
        .filter(|b| !b.is_immovable() && !b.freeze_rotation)
    {
        // The candidate momentum already opposes this body's spin.
        let momentum = body.world_inertia(&frame1) * (n * spin_along_normal);
        if momentum.length() <= static_magnitude {
            body.apply_instantaneous_torque(momentum);
        } else {
            let alignment = body.angular_velocity.dot(momentum);
            let direction = if alignment < -EPSILON {
                1.0
            } else if alignment > EPSILON {
                -1.0
            } else {
                0.0
            };
            body.apply_instantaneous_torque(
                momentum.normalize_or_zero() * dynamic_magnitude * direction,
            );
        }
    }

    let frame2 = obj2.frame.clone();
    if let Some(body) = obj2
        .body
        .as_mut()
        .filter(|b| !b.is_immovable() && !b.freeze_rotation)
    {
        // Here the candidate momentum runs with this body's spin; negate it.
        let momentum = body.world_inertia(&frame2) * (n * spin_along_normal);
        if momentum.length() <= static_magnitude {
            body.apply_instantaneous_torque(-momentum);
        } else {
            let alignment = body.angular_velocity.dot(momentum);
            let direction = if alignment < -EPSILON {
                1.0
            } else if alignment > EPSILON {
                -1.0
            } else {
                0.0
            };
            body.apply_instantaneous_torque(
                momentum.normalize_or_zero() * dynamic_magnitude * direction,
            );
        }
    }
}

/// Bleed off in-plane angular momentum, clamped by the collision impulse.
fn apply_rolling_resistance(
    obj1: &mut GameObject,
    obj2: &mut GameObject,
    collision: &Collision,
    point1: Vec3,
    point2: Vec3,
    resistance_coefficient: f32,
) {
    let n = collision.mtv;
    let resistance = collision.impulse * resistance_coefficient;
    if resistance <= 0.0 {
        return;
    }

    let mut apply = |object: &mut GameObject, point: Vec3| {
        let radius = point - object.frame.position;
        let frame = object.frame.clone();
        if let Some(body) = object
            .body
            .as_mut()
            .filter(|b| !b.is_immovable() && !b.freeze_rotation)
        {
            // Current momentum including impulses applied earlier this tick.
            let momentum = body.angular_momentum(&frame) + body.net_instantaneous_torque;
            let in_plane = momentum - project(momentum, n);
            let magnitude = in_plane.length();
            if magnitude <= EPSILON {
                return;
            }
            let clamped = (resistance * radius.length()).min(magnitude);
            body.apply_instantaneous_torque(-in_plane / magnitude * clamped);
        }
    };

    apply(obj1, point1);
    apply(obj2, point2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Aabb, Collider, CollisionWorld};
    use crate::physics::{apply_gravity, integrate_scene};
    use crate::scene::ObjectId;

    fn collision_world() -> CollisionWorld {
        CollisionWorld::new(
            Aabb {
                min: Vec3::splat(-64.0),
                max: Vec3::splat(64.0),
            },
            3,
        )
    }

    fn tick(
        scene: &mut ScenePool,
        world: &mut CollisionWorld,
        gravity: Vec3,
        dt: f32,
    ) {
        apply_gravity(scene, gravity);
        world.detect(scene);
        resolve(scene, world.collisions_mut());
        scene.apply_queues();
        integrate_scene(scene, dt);
    }

    fn kinetic_energy(scene: &ScenePool, ids: &[ObjectId]) -> f32 {
        ids.iter()
            .filter_map(|id| scene.get(*id))
            .filter_map(|o| o.body.as_ref())
            .map(|b| 0.5 / b.inverse_mass * b.linear_velocity.length_squared())
            .sum()
    }

    fn elastic_sphere(position: Vec3, velocity: Vec3) -> GameObject {
        let mut object = GameObject::new(FrameOfReference::from_position(position));
        let mut body = RigidBody::dynamic(1.0, RigidBody::sphere_inertia(1.0, 1.0));
        body.restitution = 1.0;
        body.static_friction = 0.0;
        body.dynamic_friction = 0.0;
        body.rolling_resistance = 0.0;
        body.linear_velocity = velocity;
        object.body = Some(body);
        object.collider = Some(Collider::new(ColliderShape::sphere(Vec3::ZERO, 1.0)));
        object
    }

    #[test]
    fn test_elastic_collision_conserves_energy() {
        let mut scene = ScenePool::new();
        // Slightly overlapping spheres approaching diagonally.
        let a = scene.spawn(elastic_sphere(Vec3::ZERO, Vec3::new(1.0, 0.5, 0.0)));
        let b = scene.spawn(elastic_sphere(
            Vec3::new(1.8, 0.0, 0.0),
            Vec3::new(-1.0, 0.3, 0.0),
        ));

        let before = kinetic_energy(&scene, &[a, b]);

        let mut world = collision_world();
        tick(&mut scene, &mut world, Vec3::ZERO, 1e-3);

        let after = kinetic_energy(&scene, &[a, b]);
        assert!(
            (before - after).abs() < 1e-4 * before.max(1.0),
            "energy drifted: {before} -> {after}"
        );
    }

    #[test]
    fn test_elastic_head_on_swaps_velocities() {
        let mut scene = ScenePool::new();
        let a = scene.spawn(elastic_sphere(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)));
        let b = scene.spawn(elastic_sphere(
            Vec3::new(1.9, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
        ));

        let mut world = collision_world();
        tick(&mut scene, &mut world, Vec3::ZERO, 1e-3);

        let va = scene.get(a).unwrap().body.as_ref().unwrap().linear_velocity;
        let vb = scene.get(b).unwrap().body.as_ref().unwrap().linear_velocity;
        assert!(va.x.abs() < 1e-4, "moving sphere kept {va:?}");
        assert!((vb.x - 2.0).abs() < 1e-4, "struck sphere got {vb:?}");
    }

    #[test]
    fn test_resting_contact_settles() {
        let mut scene = ScenePool::new();

        // Unit-mass sphere released just above an immovable slab, plastic
        // contact with full friction.
        let radius = 0.1;
        let mut sphere = GameObject::new(FrameOfReference::from_position(Vec3::new(0.0, 1.0, 0.0)));
        let mut body = RigidBody::dynamic(1.0, RigidBody::sphere_inertia(1.0, radius));
        body.restitution = 0.0;
        body.static_friction = 1.0;
        body.dynamic_friction = 1.0;
        sphere.body = Some(body);
        sphere.collider = Some(Collider::new(ColliderShape::sphere(Vec3::ZERO, radius)));
        let id = scene.spawn(sphere);

        let mut ground = GameObject::new(FrameOfReference::identity());
        let mut ground_body = RigidBody::immovable();
        ground_body.restitution = 0.0;
        ground.body = Some(ground_body);
        ground.collider = Some(Collider::new(ColliderShape::aabb(
            Vec3::new(-5.0, -1.0, -5.0),
            Vec3::new(5.0, 0.0, 5.0),
        )));
        scene.spawn(ground);

        // At this step size the contact resolves every tick, so the
        // residual speed stays at one tick's worth of gravity.
        let gravity = Vec3::new(0.0, -9.81, 0.0);
        let dt = 1e-4;
        let mut world = collision_world();
        for _ in 0..20_000 {
            tick(&mut scene, &mut world, gravity, dt);
        }

        let object = scene.get(id).unwrap();
        let speed = object.body.as_ref().unwrap().linear_velocity.length();
        assert!(speed <= 1e-3, "still moving at {speed}");
        assert!(
            (object.frame.position.y - radius).abs() <= 1e-3,
            "rest height {}",
            object.frame.position.y
        );
    }

    #[test]
    fn test_restitution_halves_bounce_speed() {
        let mut scene = ScenePool::new();

        let mut sphere = GameObject::new(FrameOfReference::from_position(Vec3::new(0.0, 5.0, 0.0)));
        let mut body = RigidBody::dynamic(1.0, RigidBody::sphere_inertia(1.0, 0.5));
        body.restitution = 0.5;
        body.static_friction = 0.0;
        body.dynamic_friction = 0.0;
        sphere.body = Some(body);
        sphere.collider = Some(Collider::new(ColliderShape::sphere(Vec3::ZERO, 0.5)));
        let id = scene.spawn(sphere);

        let mut ground = GameObject::new(FrameOfReference::identity());
        let mut ground_body = RigidBody::immovable();
        ground_body.restitution = 1.0;
        ground.body = Some(ground_body);
        ground.collider = Some(Collider::new(ColliderShape::aabb(
            Vec3::new(-5.0, -0.5, -5.0),
            Vec3::new(5.0, 0.5, 5.0),
        )));
        scene.spawn(ground);

        let gravity = Vec3::new(0.0, -9.81, 0.0);
        let dt = 1e-3;
        let mut world = collision_world();

        let mut impact_speed = 0.0f32;
        let mut bounce_speed = None;
        for _ in 0..2000 {
            let before = scene.get(id).unwrap().body.as_ref().unwrap().linear_velocity.y;
            tick(&mut scene, &mut world, gravity, dt);
            let after = scene.get(id).unwrap().body.as_ref().unwrap().linear_velocity.y;
            if before < 0.0 && after > 0.0 {
                impact_speed = -before;
                bounce_speed = Some(after);
                break;
            }
        }

        let bounce_speed = bounce_speed.expect("sphere never bounced");
        let ratio = bounce_speed / impact_speed;
        assert!(
            (ratio - 0.5).abs() <= 0.02,
            "bounce ratio {ratio} (impact {impact_speed}, bounce {bounce_speed})"
        );
    }

    #[test]
    fn test_static_friction_holds_cube() {
        let mut scene = ScenePool::new();

        // 2x2x2 hull cube resting on a hull slab.
        let mut cube = GameObject::new(FrameOfReference::from_position(Vec3::new(0.0, 1.0, 0.0)));
        let mut body = RigidBody::dynamic(1.0, RigidBody::cuboid_inertia(1.0, Vec3::ONE));
        body.restitution = 0.0;
        body.static_friction = 1.0;
        body.dynamic_friction = 0.5;
        body.freeze_rotation = true;
        cube.body = Some(body);
        cube.collider = Some(Collider::new(ColliderShape::convex_hull(
            ConvexHullCollider::cuboid(Vec3::ONE),
        )));
        let id = scene.spawn(cube);

        let mut ground = GameObject::new(FrameOfReference::from_position(Vec3::new(
            0.0, -0.5, 0.0,
        )));
        let mut ground_body = RigidBody::immovable();
        ground_body.restitution = 0.0;
        ground.body = Some(ground_body);
        ground.collider = Some(Collider::new(ColliderShape::convex_hull(
            ConvexHullCollider::cuboid(Vec3::new(10.0, 0.5, 10.0)),
        )));
        scene.spawn(ground);

        let gravity = Vec3::new(0.0, -9.81, 0.0);
        let dt = 1e-3;
        let mut world = collision_world();

        // Let the cube settle into resting contact.
        for _ in 0..500 {
            tick(&mut scene, &mut world, gravity, dt);
        }
        let settled_x = scene.get(id).unwrap().frame.position.x;

        // One tick of horizontal force at half the grip threshold.
        scene
            .get_mut(id)
            .unwrap()
            .body
            .as_mut()
            .unwrap()
            .apply_force(Vec3::new(0.5 * 9.81, 0.0, 0.0), Vec3::ZERO);

        for _ in 0..1000 {
            tick(&mut scene, &mut world, gravity, dt);
        }

        let final_x = scene.get(id).unwrap().frame.position.x;
        assert!(
            (final_x - settled_x).abs() < 1e-3,
            "cube slid from {settled_x} to {final_x}"
        );
    }

    #[test]
    fn test_rolling_resistance_stops_spin() {
        let mut scene = ScenePool::new();

        let mut sphere = GameObject::new(FrameOfReference::from_position(Vec3::new(0.0, 0.5, 0.0)));
        let mut body = RigidBody::dynamic(1.0, RigidBody::sphere_inertia(1.0, 0.5));
        body.restitution = 0.0;
        body.static_friction = 0.0;
        body.dynamic_friction = 0.0;
        body.rolling_resistance = 1.0;
        // Rolling about z (in the contact plane).
        body.angular_velocity = Vec3::new(0.0, 0.0, 4.0);
        sphere.body = Some(body);
        sphere.collider = Some(Collider::new(ColliderShape::sphere(Vec3::ZERO, 0.5)));
        let id = scene.spawn(sphere);

        let mut ground = GameObject::new(FrameOfReference::identity());
        let mut ground_body = RigidBody::immovable();
        ground_body.restitution = 0.0;
        ground_body.static_friction = 0.0;
        ground_body.dynamic_friction = 0.0;
        ground_body.rolling_resistance = 1.0;
        ground.body = Some(ground_body);
        ground.collider = Some(Collider::new(ColliderShape::aabb(
            Vec3::new(-5.0, -1.0, -5.0),
            Vec3::new(5.0, 0.0, 5.0),
        )));
        scene.spawn(ground);

        let gravity = Vec3::new(0.0, -9.81, 0.0);
        let dt = 1e-3;
        let mut world = collision_world();
        let initial_spin = 4.0;
        for _ in 0..2000 {
            tick(&mut scene, &mut world, gravity, dt);
        }

        let spin = scene
            .get(id)
            .unwrap()
            .body
            .as_ref()
            .unwrap()
            .angular_velocity
            .length();
        assert!(
            spin < 0.5 * initial_spin,
            "rolling resistance barely slowed the spin: {spin}"
        );
    }

    #[test]
    fn test_decouple_skips_frozen_bodies() {
        let mut scene = ScenePool::new();
        let a = scene.spawn(elastic_sphere(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)));
        let b = scene.spawn(elastic_sphere(Vec3::new(1.5, 0.0, 0.0), Vec3::ZERO));
        scene
            .get_mut(b)
            .unwrap()
            .body
            .as_mut()
            .unwrap()
            .freeze_translation = true;

        let mut world = collision_world();
        world.detect(&mut scene);
        resolve(&mut scene, world.collisions_mut());

        // The frozen body stayed; the moving one carried the whole overlap.
        assert!((scene.get(b).unwrap().frame.position.x - 1.5).abs() < 1e-6);
        assert!(scene.get(a).unwrap().frame.position.x < 0.0);
    }

    #[test]
    fn test_contact_point_on_resting_sphere() {
        let mut scene = ScenePool::new();
        let sphere = elastic_sphere(Vec3::new(0.0, 0.9, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let a = scene.spawn(sphere);

        let mut ground = GameObject::new(FrameOfReference::identity());
        ground.body = Some(RigidBody::immovable());
        ground.collider = Some(Collider::new(ColliderShape::aabb(
            Vec3::new(-5.0, -1.0, -5.0),
            Vec3::new(5.0, 0.0, 5.0),
        )));
        let b = scene.spawn(ground);

        let mut world = collision_world();
        world.detect(&mut scene);
        let collision = world.collisions()[0];

        let (obj1, obj2) = scene.get_pair_mut(collision.object_a, collision.object_b).unwrap();
        let (p1, p2) = contact_points(obj1, obj2, collision.mtv);
        let (sphere_point, box_point) = if collision.object_a == a {
            (p1, p2)
        } else {
            (p2, p1)
        };
        let _ = b;

        // Sphere contacts at its lowest point, the box at its centre of mass.
        assert!((sphere_point - Vec3::new(0.0, -0.1, 0.0)).length() < 1e-4);
        assert!(box_point.length() < 1e-6);
    }
}
