//! Narrow-phase pairwise tests: analytic tests and the separating axis
//! theorem over the collider variants.
//!
//! Only the upper triangle of the 4x4 (variant, variant) table is
//! implemented; when the first collider's variant index is greater than the
//! second's the pair is swapped and the result's MTV is negated. The MTV
//! always points toward the first object of the *caller's* pair.

use glam::Vec3;

use crate::frame::FrameOfReference;
use crate::math::projection_bounds;

use super::collider::{
    AabbCollider, ColliderShape, ConvexHullCollider, RayCollider, SphereCollider,
};

const EPSILON: f32 = 1e-6;

/// The result of a positive pairwise test.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit minimum translation vector, pointing toward object 1.
    /// For ray pairs this is the ray direction oriented toward object 1.
    pub mtv: Vec3,
    /// Positive overlap along the MTV. For ray pairs this is the hit
    /// parameter along the ray instead.
    pub overlap: f32,
}

impl Contact {
    fn flipped(self) -> Self {
        Self {
            mtv: -self.mtv,
            overlap: self.overlap,
        }
    }
}

/// Test an ordered collider pair, dispatching on the variant combination.
pub fn test_pair(
    a: &ColliderShape,
    frame_a: &FrameOfReference,
    b: &ColliderShape,
    frame_b: &FrameOfReference,
) -> Option<Contact> {
    if a.variant_index() > b.variant_index() {
        return test_pair(b, frame_b, a, frame_a).map(Contact::flipped);
    }

    use ColliderShape::*;
    match (a, b) {
        (Sphere(s1), Sphere(s2)) => sphere_sphere(s1, s2),
        (Sphere(s), Aabb(bx)) => sphere_aabb(s, bx),
        (Sphere(s), ConvexHull(h)) => sphere_hull(s, h, frame_b),
        (Sphere(s), Ray(r)) => sphere_ray(s, r),
        (Aabb(b1), Aabb(b2)) => aabb_aabb(b1, b2),
        (Aabb(bx), ConvexHull(h)) => aabb_hull(bx, h, frame_b),
        (Aabb(bx), Ray(r)) => aabb_ray(bx, r),
        (ConvexHull(h1), ConvexHull(h2)) => hull_hull(h1, frame_a, h2, frame_b),
        (ConvexHull(h), Ray(r)) => hull_ray(h, frame_a, r),
        (Ray(r1), Ray(r2)) => ray_ray(r1, r2),
        // The swap above leaves only the upper triangle.
        _ => unreachable!("lower-triangle pair reached dispatch"),
    }
}

/// Sphere-sphere: intersect iff the centre distance is under the radius sum.
fn sphere_sphere(s1: &SphereCollider, s2: &SphereCollider) -> Option<Contact> {
    let delta = s1.world_centre - s2.world_centre;
    let distance = delta.length();
    let radius_sum = s1.world_radius + s2.world_radius;
    if distance >= radius_sum {
        return None;
    }
    if distance <= EPSILON {
        // Coincident centres: degenerate, no interaction.
        return None;
    }
    Some(Contact {
        mtv: delta / distance,
        overlap: radius_sum - distance,
    })
}

/// Sphere-AABB: clamp the centre to the box to find the nearest point.
fn sphere_aabb(s: &SphereCollider, bx: &AabbCollider) -> Option<Contact> {
    let c = s.world_centre;
    let nearest = c.clamp(bx.world.min, bx.world.max);
    let delta = c - nearest;
    let distance = delta.length();

    if distance > EPSILON {
        if distance > s.world_radius {
            return None;
        }
        return Some(Contact {
            mtv: delta / distance,
            overlap: s.world_radius - distance,
        });
    }

    // Centre inside the box: push out through the nearest face.
    let mut best_depth = f32::MAX;
    let mut best_axis = Vec3::Y;
    for axis in 0..3 {
        let to_min = c[axis] - bx.world.min[axis];
        let to_max = bx.world.max[axis] - c[axis];
        let mut unit = Vec3::ZERO;
        if to_min < to_max {
            unit[axis] = -1.0;
            if to_min < best_depth {
                best_depth = to_min;
                best_axis = unit;
            }
        } else {
            unit[axis] = 1.0;
            if to_max < best_depth {
                best_depth = to_max;
                best_axis = unit;
            }
        }
    }
    Some(Contact {
        mtv: best_axis,
        overlap: s.world_radius + best_depth,
    })
}

/// AABB-AABB: per-axis interval tests; the MTV axis is the one with the
/// smallest overlap, signed toward object 1.
fn aabb_aabb(b1: &AabbCollider, b2: &AabbCollider) -> Option<Contact> {
    let mut smallest = f32::MAX;
    let mut axis = Vec3::ZERO;

    for i in 0..3 {
        let overlap =
            b1.world.max[i].min(b2.world.max[i]) - b1.world.min[i].max(b2.world.min[i]);
        if overlap < 0.0 {
            return None;
        }
        if overlap < smallest {
            smallest = overlap;
            let mut unit = Vec3::ZERO;
            unit[i] = 1.0;
            axis = unit;
        }
    }

    if axis.dot(b1.world.centre() - b2.world.centre()) < 0.0 {
        axis = -axis;
    }
    Some(Contact {
        mtv: axis,
        overlap: smallest,
    })
}

/// Closest point to `p` on the segment `a..b`.
fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Sphere-convex hull: find the globally nearest point on any face whose
/// plane is within the radius, then test the distance to it. The sphere is
/// object 1 by convention.
fn sphere_hull(
    s: &SphereCollider,
    hull: &ConvexHullCollider,
    hull_frame: &FrameOfReference,
) -> Option<Contact> {
    let c = s.world_centre;

    // Signed distances to every face plane; all negative means the centre is
    // inside the hull.
    let mut max_signed = f32::MIN;
    let mut max_face = 0;
    let mut signed = Vec::with_capacity(hull.faces.len());
    for (i, face) in hull.faces.iter().enumerate() {
        let n = hull.world_normals[i];
        let v0 = hull.world_vertices[face.indices[0]] + hull_frame.position;
        let d = (c - v0).dot(n);
        signed.push(d);
        if d > max_signed {
            max_signed = d;
            max_face = i;
        }
    }

    if max_signed < 0.0 {
        // Deep penetration: push out through the least-penetrated face.
        return Some(Contact {
            mtv: hull.world_normals[max_face],
            overlap: s.world_radius - max_signed,
        });
    }

    let mut best: Option<Vec3> = None;
    let mut best_dist = f32::MAX;

    for (i, face) in hull.faces.iter().enumerate() {
        if signed[i] >= s.world_radius || signed[i] < 0.0 {
            continue;
        }
        let n = hull.world_normals[i];
        let foot = c - signed[i] * n;

        // Inside test: the foot is within the face polygon when it is on the
        // inner side of every boundary edge.
        let count = face.indices.len();
        let mut inside = true;
        for k in 0..count {
            let a = hull.world_vertices[face.indices[k]] + hull_frame.position;
            let b = hull.world_vertices[face.indices[(k + 1) % count]] + hull_frame.position;
            if (b - a).cross(foot - a).dot(n) < -EPSILON {
                inside = false;
                break;
            }
        }

        let candidate = if inside {
            foot
        } else {
            // Clamp to the nearest boundary edge.
            let mut nearest = foot;
            let mut nearest_dist = f32::MAX;
            for k in 0..count {
                let a = hull.world_vertices[face.indices[k]] + hull_frame.position;
                let b = hull.world_vertices[face.indices[(k + 1) % count]] + hull_frame.position;
                let q = closest_point_on_segment(c, a, b);
                let d = (c - q).length_squared();
                if d < nearest_dist {
                    nearest_dist = d;
                    nearest = q;
                }
            }
            nearest
        };

        let dist = (c - candidate).length();
        if dist < best_dist {
            best_dist = dist;
            best = Some(candidate);
        }
    }

    let p = best?;
    if best_dist > s.world_radius || best_dist <= EPSILON {
        return None;
    }
    Some(Contact {
        mtv: (c - p) / best_dist,
        overlap: s.world_radius - best_dist,
    })
}

/// Generic two-phase SAT over world-space point sets.
///
/// `normals` are the face-normal candidate axes, `edges` the edge directions
/// whose pairwise cross products form the second-phase axes. The returned
/// MTV points toward point set 1.
fn sat(
    points1: &[Vec3],
    normals1: &[Vec3],
    edges1: &[Vec3],
    points2: &[Vec3],
    normals2: &[Vec3],
    edges2: &[Vec3],
) -> Option<Contact> {
    let mut smallest = f32::MAX;
    let mut best_axis = Vec3::ZERO;

    let mut test_axis = |axis: Vec3| -> bool {
        let (min1, max1) = projection_bounds(axis, points1.iter().copied());
        let (min2, max2) = projection_bounds(axis, points2.iter().copied());
        let overlap = max1.min(max2) - min1.max(min2);
        if overlap < 0.0 {
            return false;
        }
        if overlap < smallest {
            smallest = overlap;
            // Sign the axis toward point set 1.
            let mid1 = 0.5 * (min1 + max1);
            let mid2 = 0.5 * (min2 + max2);
            best_axis = if mid1 >= mid2 { axis } else { -axis };
        }
        true
    };

    // Face-normal phase.
    for &axis in normals1.iter().chain(normals2) {
        if !test_axis(axis) {
            return None;
        }
    }

    // Edge-cross phase; degenerate (near parallel) pairs add no axis.
    for &e1 in edges1 {
        for &e2 in edges2 {
            let cross = e1.cross(e2);
            let len_sq = cross.length_squared();
            if len_sq <= EPSILON {
                continue;
            }
            if !test_axis(cross / len_sq.sqrt()) {
                return None;
            }
        }
    }

    Some(Contact {
        mtv: best_axis,
        overlap: smallest,
    })
}

/// World-space hull points: cached offsets plus the frame position.
fn hull_world_points(hull: &ConvexHullCollider, frame: &FrameOfReference) -> Vec<Vec3> {
    hull.world_vertices
        .iter()
        .map(|v| *v + frame.position)
        .collect()
}

/// The corner points of a world-space AABB.
fn aabb_corners(bx: &AabbCollider) -> Vec<Vec3> {
    let (min, max) = (bx.world.min, bx.world.max);
    (0..8)
        .map(|i| {
            Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        })
        .collect()
}

const AXES: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

/// AABB-hull: the box is synthesised as a canonical 8-vertex, 6-face
/// (3 unique normals), 3-edge convex hull and fed to the SAT.
fn aabb_hull(
    bx: &AabbCollider,
    hull: &ConvexHullCollider,
    hull_frame: &FrameOfReference,
) -> Option<Contact> {
    let box_points = aabb_corners(bx);
    let hull_points = hull_world_points(hull, hull_frame);
    sat(
        &box_points,
        &AXES,
        &AXES,
        &hull_points,
        &hull.world_normals,
        &hull.world_edges,
    )
}

/// Hull-hull separating axis test.
fn hull_hull(
    h1: &ConvexHullCollider,
    frame1: &FrameOfReference,
    h2: &ConvexHullCollider,
    frame2: &FrameOfReference,
) -> Option<Contact> {
    let points1 = hull_world_points(h1, frame1);
    let points2 = hull_world_points(h2, frame2);
    sat(
        &points1,
        &h1.world_normals,
        &h1.world_edges,
        &points2,
        &h2.world_normals,
        &h2.world_edges,
    )
}

/// Sphere-ray: translate so the ray origin is at the origin and compare the
/// perpendicular distance against the radius. `overlap` is the entry
/// parameter along the ray.
fn sphere_ray(s: &SphereCollider, ray: &RayCollider) -> Option<Contact> {
    let to_centre = s.world_centre - ray.world_origin;
    let t = to_centre.dot(ray.world_direction);
    if t < 0.0 {
        return None;
    }
    let perp_sq = to_centre.length_squared() - t * t;
    let r_sq = s.world_radius * s.world_radius;
    if perp_sq > r_sq {
        return None;
    }
    Some(Contact {
        mtv: ray.world_direction,
        overlap: t - (r_sq - perp_sq).sqrt(),
    })
}

/// AABB-ray slab test. Zero direction components use a sentinel of -1 for
/// their entering parameter rather than infinities, so the hit parameter is
/// the maximum entering value and the hit point is verified against the box
/// on the remaining axes.
fn aabb_ray(bx: &AabbCollider, ray: &RayCollider) -> Option<Contact> {
    let o = ray.world_origin;
    let d = ray.world_direction;
    let (min, max) = (bx.world.min, bx.world.max);

    let mut t_in = [-1.0f32; 3];
    for i in 0..3 {
        if d[i].abs() > EPSILON {
            let t1 = (min[i] - o[i]) / d[i];
            let t2 = (max[i] - o[i]) / d[i];
            t_in[i] = t1.min(t2);
        } else if o[i] < min[i] || o[i] > max[i] {
            // Parallel to the slab and outside it.
            return None;
        }
    }

    let t_hit = t_in[0].max(t_in[1]).max(t_in[2]).max(0.0);
    let p = o + d * t_hit;
    const SLOP: f32 = 1e-4;
    for i in 0..3 {
        if p[i] < min[i] - SLOP || p[i] > max[i] + SLOP {
            return None;
        }
    }
    Some(Contact {
        mtv: d,
        overlap: t_hit,
    })
}

/// Hull-ray: clip the ray against every face plane, keeping the running
/// (max entering, min exiting) pair.
fn hull_ray(
    hull: &ConvexHullCollider,
    hull_frame: &FrameOfReference,
    ray: &RayCollider,
) -> Option<Contact> {
    let o = ray.world_origin;
    let d = ray.world_direction;

    let mut t_in_max = 0.0f32;
    let mut t_out_min = f32::MAX;

    for (i, face) in hull.faces.iter().enumerate() {
        let n = hull.world_normals[i];
        let v0 = hull.world_vertices[face.indices[0]] + hull_frame.position;
        let denom = d.dot(n);
        let num = (v0 - o).dot(n);

        if denom.abs() <= EPSILON {
            // Parallel to the face plane; outside the half-space means miss.
            if num < 0.0 {
                return None;
            }
            continue;
        }

        let t = num / denom;
        if denom < 0.0 {
            t_in_max = t_in_max.max(t);
        } else {
            t_out_min = t_out_min.min(t);
        }
    }

    if t_in_max > t_out_min {
        return None;
    }
    Some(Contact {
        mtv: d,
        overlap: t_in_max,
    })
}

/// Ray-ray: parallel rays are compared component-wise for coincidence;
/// otherwise closeness is a scalar triple product within an epsilon.
fn ray_ray(r1: &RayCollider, r2: &RayCollider) -> Option<Contact> {
    let cross = r1.world_direction.cross(r2.world_direction);
    let offset = r2.world_origin - r1.world_origin;

    if cross.length_squared() <= EPSILON {
        // Parallel: coincident iff the offset is parallel to the direction.
        if offset.cross(r1.world_direction).length_squared() <= EPSILON {
            return Some(Contact {
                mtv: -r2.world_direction,
                overlap: 0.0,
            });
        }
        return None;
    }

    // Coplanarity within epsilon.
    if offset.dot(cross).abs() > 1e-4 {
        return None;
    }

    let len_sq = cross.length_squared();
    let t1 = offset.cross(r2.world_direction).dot(cross) / len_sq;
    let t2 = offset.cross(r1.world_direction).dot(cross) / len_sq;
    if t1 < 0.0 || t2 < 0.0 {
        return None;
    }
    Some(Contact {
        mtv: -r2.world_direction,
        overlap: t1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refreshed(mut shape: ColliderShape, frame: &FrameOfReference) -> ColliderShape {
        shape.refresh(frame);
        shape
    }

    #[test]
    fn test_sphere_sphere_values() {
        let fa = FrameOfReference::identity();
        let fb = FrameOfReference::from_position(Vec3::new(1.5, 0.0, 0.0));
        let a = refreshed(ColliderShape::sphere(Vec3::ZERO, 1.0), &fa);
        let b = refreshed(ColliderShape::sphere(Vec3::ZERO, 1.0), &fb);

        let contact = test_pair(&a, &fa, &b, &fb).unwrap();
        assert!((contact.mtv - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
        assert!((contact.overlap - 0.5).abs() < 1e-5);

        let far = FrameOfReference::from_position(Vec3::new(3.0, 0.0, 0.0));
        let b = refreshed(ColliderShape::sphere(Vec3::ZERO, 1.0), &far);
        assert!(test_pair(&a, &fa, &b, &far).is_none());
    }

    #[test]
    fn test_detector_symmetry() {
        let fa = FrameOfReference::identity();
        let fb = FrameOfReference::from_position(Vec3::new(0.5, 1.2, 0.0));
        let a = refreshed(ColliderShape::sphere(Vec3::ZERO, 1.0), &fa);
        let b = refreshed(ColliderShape::aabb(Vec3::splat(-1.0), Vec3::splat(1.0)), &fb);

        let ab = test_pair(&a, &fa, &b, &fb).unwrap();
        let ba = test_pair(&b, &fb, &a, &fa).unwrap();
        assert!((ab.mtv + ba.mtv).length() < 1e-5);
        assert!((ab.overlap - ba.overlap).abs() < 1e-5);
    }

    #[test]
    fn test_aabb_aabb_smallest_axis() {
        let fa = FrameOfReference::identity();
        let fb = FrameOfReference::identity();
        let a = refreshed(ColliderShape::aabb(Vec3::splat(-1.0), Vec3::splat(1.0)), &fa);
        // Offset in y only: the y axis has the smallest overlap.
        let b = refreshed(
            ColliderShape::aabb(Vec3::new(-1.0, 0.8, -1.0), Vec3::new(1.0, 2.8, 1.0)),
            &fb,
        );

        let contact = test_pair(&a, &fa, &b, &fb).unwrap();
        // MTV points toward object 1, which sits below object 2.
        assert!((contact.mtv - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);
        assert!((contact.overlap - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_hull_face_contact() {
        let hull_frame = FrameOfReference::identity();
        let hull = refreshed(
            ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE)),
            &hull_frame,
        );
        // Sphere resting on the +y face, slightly overlapping.
        let sphere_frame = FrameOfReference::from_position(Vec3::new(0.0, 1.9, 0.0));
        let sphere = refreshed(ColliderShape::sphere(Vec3::ZERO, 1.0), &sphere_frame);

        let contact = test_pair(&sphere, &sphere_frame, &hull, &hull_frame).unwrap();
        assert!((contact.mtv - Vec3::Y).length() < 1e-4);
        assert!((contact.overlap - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_hull_edge_contact() {
        let hull_frame = FrameOfReference::identity();
        let hull = refreshed(
            ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE)),
            &hull_frame,
        );
        // Sphere near the +x/+y edge, outside both faces.
        let p = Vec3::new(1.5, 1.5, 0.0);
        let sphere_frame = FrameOfReference::from_position(p);
        let sphere = refreshed(ColliderShape::sphere(Vec3::ZERO, 0.8), &sphere_frame);

        let contact = test_pair(&sphere, &sphere_frame, &hull, &hull_frame).unwrap();
        let expected_dir = (p - Vec3::new(1.0, 1.0, 0.0)).normalize();
        assert!((contact.mtv - expected_dir).length() < 1e-4);
        let expected_overlap = 0.8 - (p - Vec3::new(1.0, 1.0, 0.0)).length();
        assert!((contact.overlap - expected_overlap).abs() < 1e-4);
    }

    #[test]
    fn test_hull_hull_sat() {
        let fa = FrameOfReference::identity();
        let fb = FrameOfReference::from_position(Vec3::new(0.0, 1.8, 0.0));
        let a = refreshed(
            ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE)),
            &fa,
        );
        let b = refreshed(
            ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE)),
            &fb,
        );

        let contact = test_pair(&a, &fa, &b, &fb).unwrap();
        assert!((contact.mtv - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);
        assert!((contact.overlap - 0.2).abs() < 1e-4);

        let far = FrameOfReference::from_position(Vec3::new(0.0, 2.5, 0.0));
        let b = refreshed(
            ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE)),
            &far,
        );
        assert!(test_pair(&a, &fa, &b, &far).is_none());
    }

    #[test]
    fn test_hull_hull_rotated_edge_case() {
        // A cube rotated 45 degrees about z meeting another cube corner-on;
        // the edge-cross phase must not report a false separation.
        let fa = FrameOfReference::identity();
        let mut fb = FrameOfReference::from_position(Vec3::new(0.0, 2.3, 0.0));
        fb.rotate(Vec3::Z, std::f32::consts::FRAC_PI_4);

        let a = refreshed(
            ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE)),
            &fa,
        );
        let b = refreshed(
            ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE)),
            &fb,
        );

        // Rotated cube's lowest corner reaches y = 2.3 - sqrt(2) ≈ 0.886,
        // which is inside the unit cube's top face at y = 1.
        let contact = test_pair(&a, &fa, &b, &fb).unwrap();
        assert!(contact.overlap > 0.0);
        assert!(contact.mtv.y < 0.0);
    }

    #[test]
    fn test_sat_duality() {
        // Flipping the MTV and re-projecting yields the identical overlap.
        let fa = FrameOfReference::identity();
        let fb = FrameOfReference::from_position(Vec3::new(1.2, 1.5, 0.3));
        let a = refreshed(
            ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE)),
            &fa,
        );
        let b = refreshed(
            ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE)),
            &fb,
        );

        let ab = test_pair(&a, &fa, &b, &fb).unwrap();
        let ba = test_pair(&b, &fb, &a, &fa).unwrap();
        assert!((ab.mtv + ba.mtv).length() < 1e-5);
        assert!((ab.overlap - ba.overlap).abs() < 1e-5);
    }

    #[test]
    fn test_aabb_hull_dispatch() {
        let fa = FrameOfReference::identity();
        let fb = FrameOfReference::from_position(Vec3::new(0.0, 1.5, 0.0));
        let a = refreshed(ColliderShape::aabb(Vec3::splat(-1.0), Vec3::splat(1.0)), &fa);
        let b = refreshed(
            ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE)),
            &fb,
        );

        let contact = test_pair(&a, &fa, &b, &fb).unwrap();
        assert!((contact.mtv - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);
        assert!((contact.overlap - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_ray_sphere_parameter() {
        let ray_frame = FrameOfReference::identity();
        let sphere_frame = FrameOfReference::identity();
        let ray = refreshed(
            ColliderShape::ray(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0)),
            &ray_frame,
        );
        let sphere = refreshed(ColliderShape::sphere(Vec3::ZERO, 1.0), &sphere_frame);

        let contact = test_pair(&ray, &ray_frame, &sphere, &sphere_frame).unwrap();
        assert!((contact.overlap - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_sphere_behind_origin() {
        let frame = FrameOfReference::identity();
        let ray = refreshed(
            ColliderShape::ray(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 1.0)),
            &frame,
        );
        let sphere = refreshed(ColliderShape::sphere(Vec3::ZERO, 1.0), &frame);
        assert!(test_pair(&ray, &frame, &sphere, &frame).is_none());
    }

    #[test]
    fn test_ray_aabb_slab() {
        let frame = FrameOfReference::identity();
        let ray = refreshed(
            ColliderShape::ray(Vec3::new(0.0, 0.5, 5.0), Vec3::new(0.0, 0.0, -1.0)),
            &frame,
        );
        let bx = refreshed(ColliderShape::aabb(Vec3::splat(-1.0), Vec3::splat(1.0)), &frame);

        let contact = test_pair(&ray, &frame, &bx, &frame).unwrap();
        assert!((contact.overlap - 4.0).abs() < 1e-4);

        // A ray that passes beside the box on x misses even though the z
        // slabs intersect.
        let miss = refreshed(
            ColliderShape::ray(Vec3::new(3.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)),
            &frame,
        );
        assert!(test_pair(&miss, &frame, &bx, &frame).is_none());
    }

    #[test]
    fn test_ray_hull_clip() {
        let frame = FrameOfReference::identity();
        let ray = refreshed(
            ColliderShape::ray(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)),
            &frame,
        );
        let hull = refreshed(
            ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE)),
            &frame,
        );

        let contact = test_pair(&ray, &frame, &hull, &frame).unwrap();
        assert!((contact.overlap - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_ray_intersection() {
        let frame = FrameOfReference::identity();
        let r1 = refreshed(ColliderShape::ray(Vec3::new(-5.0, 0.0, 0.0), Vec3::X), &frame);
        let r2 = refreshed(ColliderShape::ray(Vec3::new(0.0, -3.0, 0.0), Vec3::Y), &frame);

        let contact = test_pair(&r1, &frame, &r2, &frame).unwrap();
        assert!((contact.overlap - 5.0).abs() < 1e-4);

        // Skew rays (offset out of plane) do not intersect.
        let r3 = refreshed(
            ColliderShape::ray(Vec3::new(0.0, -3.0, 1.0), Vec3::Y),
            &frame,
        );
        assert!(test_pair(&r1, &frame, &r3, &frame).is_none());
    }
}
