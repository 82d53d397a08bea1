//! Collider variants and their world-space caches.
//!
//! Each variant stores its primitive data in object space plus a cache of the
//! world-space form used by the detector and the ray-trace kernels. Caches
//! must be refreshed whenever the owning frame changes and before any test
//! consumes them; `refresh` is idempotent within a tick.

use glam::Vec3;

use crate::frame::FrameOfReference;

use super::Aabb;

/// Sphere collider: object-space centre offset and radius.
#[derive(Debug, Clone)]
pub struct SphereCollider {
    pub centre: Vec3,
    pub radius: f32,
    /// World-space centre and max-axis-scaled radius.
    pub world_centre: Vec3,
    pub world_radius: f32,
}

/// Axis-aligned box collider with object-space min/max corners.
///
/// Rotating an AABB does not preserve axis alignment, so the cache is the
/// axis-aligned bounds of the rotated box corners.
#[derive(Debug, Clone)]
pub struct AabbCollider {
    pub min: Vec3,
    pub max: Vec3,
    pub world: Aabb,
}

/// A face of a convex hull: an ordered vertex-index loop plus the outward
/// normal in object space.
#[derive(Debug, Clone)]
pub struct HullFace {
    pub indices: Vec<usize>,
    pub normal: Vec3,
}

/// Convex hull collider: vertices, faces, and undirected edges.
#[derive(Debug, Clone)]
pub struct ConvexHullCollider {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<HullFace>,
    pub edges: Vec<(usize, usize)>,
    /// Rotated and scaled vertices, still in object-local offset form;
    /// translation is applied at intersection time.
    pub world_vertices: Vec<Vec3>,
    /// Rotated unit face normals.
    pub world_normals: Vec<Vec3>,
    /// Rotated unit edge directions.
    pub world_edges: Vec<Vec3>,
}

impl ConvexHullCollider {
    /// Build a hull with empty caches. `faces` index into `vertices`; edge
    /// pairs are vertex indices.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<HullFace>, edges: Vec<(usize, usize)>) -> Self {
        let n_vertices = vertices.len();
        let n_faces = faces.len();
        let n_edges = edges.len();
        Self {
            vertices,
            faces,
            edges,
            world_vertices: vec![Vec3::ZERO; n_vertices],
            world_normals: vec![Vec3::ZERO; n_faces],
            world_edges: vec![Vec3::ZERO; n_edges],
        }
    }

    /// An axis-aligned box hull with the given half extents: 8 vertices,
    /// 6 faces, and the 3 unique edge directions.
    pub fn cuboid(half: Vec3) -> Self {
        let h = half;
        let vertices = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        let faces = vec![
            HullFace {
                indices: vec![0, 3, 2, 1],
                normal: -Vec3::Z,
            },
            HullFace {
                indices: vec![4, 5, 6, 7],
                normal: Vec3::Z,
            },
            HullFace {
                indices: vec![0, 4, 7, 3],
                normal: -Vec3::X,
            },
            HullFace {
                indices: vec![1, 2, 6, 5],
                normal: Vec3::X,
            },
            HullFace {
                indices: vec![0, 1, 5, 4],
                normal: -Vec3::Y,
            },
            HullFace {
                indices: vec![3, 7, 6, 2],
                normal: Vec3::Y,
            },
        ];
        // Unique edge directions only; parallel edges add no SAT axes.
        let edges = vec![(0, 1), (0, 3), (0, 4)];
        Self::new(vertices, faces, edges)
    }

    /// The vertex subset furthest along `direction` (within tolerance),
    /// in world-local offset form.
    pub fn furthest_vertices(&self, direction: Vec3) -> Vec<Vec3> {
        const TOLERANCE: f32 = 1e-4;
        let mut best = f32::MIN;
        for v in &self.world_vertices {
            best = best.max(v.dot(direction));
        }
        self.world_vertices
            .iter()
            .copied()
            .filter(|v| v.dot(direction) >= best - TOLERANCE)
            .collect()
    }
}

/// Ray collider: object-space origin offset and unit direction.
#[derive(Debug, Clone)]
pub struct RayCollider {
    pub origin: Vec3,
    pub direction: Vec3,
    pub world_origin: Vec3,
    pub world_direction: Vec3,
}

/// The collider variants. Dispatch happens at the pair-table in the detector
/// rather than per instance.
#[derive(Debug, Clone)]
pub enum ColliderShape {
    Sphere(SphereCollider),
    Aabb(AabbCollider),
    ConvexHull(ConvexHullCollider),
    Ray(RayCollider),
}

impl ColliderShape {
    /// A sphere collider.
    pub fn sphere(centre: Vec3, radius: f32) -> Self {
        Self::Sphere(SphereCollider {
            centre,
            radius,
            world_centre: centre,
            world_radius: radius,
        })
    }

    /// An axis-aligned box collider from object-space corners.
    pub fn aabb(min: Vec3, max: Vec3) -> Self {
        Self::Aabb(AabbCollider {
            min,
            max,
            world: Aabb { min, max },
        })
    }

    /// A convex hull collider.
    pub fn convex_hull(hull: ConvexHullCollider) -> Self {
        Self::ConvexHull(hull)
    }

    /// A ray collider; `direction` is normalized.
    pub fn ray(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize();
        Self::Ray(RayCollider {
            origin,
            direction,
            world_origin: origin,
            world_direction: direction,
        })
    }

    /// Ordering index for the pair dispatch table.
    #[inline]
    pub(crate) fn variant_index(&self) -> u8 {
        match self {
            Self::Sphere(_) => 0,
            Self::Aabb(_) => 1,
            Self::ConvexHull(_) => 2,
            Self::Ray(_) => 3,
        }
    }

    /// Rebuild the world-space cache from the owning frame.
    pub fn refresh(&mut self, frame: &FrameOfReference) {
        match self {
            Self::Sphere(sphere) => {
                sphere.world_centre = frame.transform_point(sphere.centre);
                sphere.world_radius = sphere.radius * frame.max_scale();
            }
            Self::Aabb(aabb) => {
                // The rotated box is re-expanded to stay axis aligned.
                let mut min = Vec3::splat(f32::MAX);
                let mut max = Vec3::splat(f32::MIN);
                for i in 0..8 {
                    let corner = Vec3::new(
                        if i & 1 == 0 { aabb.min.x } else { aabb.max.x },
                        if i & 2 == 0 { aabb.min.y } else { aabb.max.y },
                        if i & 4 == 0 { aabb.min.z } else { aabb.max.z },
                    );
                    let world = frame.transform_point(corner);
                    min = min.min(world);
                    max = max.max(world);
                }
                aabb.world = Aabb { min, max };
            }
            Self::ConvexHull(hull) => {
                let rotate_scale = frame.rotate_scale();
                for (cache, vertex) in hull.world_vertices.iter_mut().zip(&hull.vertices) {
                    *cache = rotate_scale * *vertex;
                }
                for (cache, face) in hull.world_normals.iter_mut().zip(&hull.faces) {
                    *cache = frame.transform_direction(face.normal).normalize();
                }
                for (cache, &(a, b)) in hull.world_edges.iter_mut().zip(&hull.edges) {
                    let edge = rotate_scale * (hull.vertices[b] - hull.vertices[a]);
                    *cache = edge.normalize_or_zero();
                }
            }
            Self::Ray(ray) => {
                ray.world_origin = frame.transform_point(ray.origin);
                // Scale is ignored for directions.
                ray.world_direction = frame.transform_direction(ray.direction).normalize();
            }
        }
    }

    /// Conservative world bounds for the broad phase. Rays have no finite
    /// bounds and return `None`; the oct tree inserts them everywhere.
    ///
    /// Hull caches are object-local offsets, so the owning frame's position
    /// is needed to place them in world space.
    pub fn bounds(&self, frame: &FrameOfReference) -> Option<Aabb> {
        match self {
            Self::Sphere(sphere) => Some(Aabb {
                min: sphere.world_centre - Vec3::splat(sphere.world_radius),
                max: sphere.world_centre + Vec3::splat(sphere.world_radius),
            }),
            Self::Aabb(aabb) => Some(aabb.world),
            Self::ConvexHull(hull) => {
                let mut min = Vec3::splat(f32::MAX);
                let mut max = Vec3::splat(f32::MIN);
                for v in &hull.world_vertices {
                    let world = *v + frame.position;
                    min = min.min(world);
                    max = max.max(world);
                }
                Some(Aabb { min, max })
            }
            Self::Ray(_) => None,
        }
    }
}

/// A collider component: the shape variant plus the indices of the
/// collisions it participated in this tick (cleared at tick start).
#[derive(Debug, Clone)]
pub struct Collider {
    pub shape: ColliderShape,
    pub current_collisions: Vec<usize>,
}

impl Collider {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            current_collisions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_cache_uses_max_scale() {
        let mut shape = ColliderShape::sphere(Vec3::new(1.0, 0.0, 0.0), 2.0);
        let mut frame = FrameOfReference::from_position(Vec3::new(0.0, 5.0, 0.0));
        frame.scale = Vec3::new(1.0, 3.0, 0.5);
        shape.refresh(&frame);

        let ColliderShape::Sphere(sphere) = &shape else {
            unreachable!()
        };
        assert!((sphere.world_radius - 6.0).abs() < 1e-6);
        assert!((sphere.world_centre - Vec3::new(1.0, 5.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_aabb_cache_expands_when_rotated() {
        let mut shape = ColliderShape::aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
        let mut frame = FrameOfReference::identity();
        frame.rotate(Vec3::Y, std::f32::consts::FRAC_PI_4);
        shape.refresh(&frame);

        let ColliderShape::Aabb(aabb) = &shape else {
            unreachable!()
        };
        // A unit cube rotated 45 degrees about y spans sqrt(2) in x and z.
        let expected = std::f32::consts::SQRT_2;
        assert!((aabb.world.max.x - expected).abs() < 1e-5);
        assert!((aabb.world.max.z - expected).abs() < 1e-5);
        assert!((aabb.world.max.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_refresh_is_function_of_frame_alone() {
        let mut shape = ColliderShape::sphere(Vec3::ZERO, 1.0);
        let frame_a = FrameOfReference::from_position(Vec3::new(9.0, 9.0, 9.0));
        let frame_b = FrameOfReference::from_position(Vec3::new(-2.0, 0.0, 1.0));

        // refresh(f1); refresh(f2) must equal refresh(f2) alone.
        shape.refresh(&frame_a);
        shape.refresh(&frame_b);
        let ColliderShape::Sphere(after_both) = &shape else {
            unreachable!()
        };
        let centre_after_both = after_both.world_centre;

        let mut fresh = ColliderShape::sphere(Vec3::ZERO, 1.0);
        fresh.refresh(&frame_b);
        let ColliderShape::Sphere(after_one) = &fresh else {
            unreachable!()
        };
        assert!((centre_after_both - after_one.world_centre).length() < 1e-6);
    }

    #[test]
    fn test_hull_cache_stays_in_offset_form() {
        let mut shape = ColliderShape::convex_hull(ConvexHullCollider::cuboid(Vec3::ONE));
        // Translation must not leak into the cached vertices.
        let frame = FrameOfReference::from_position(Vec3::new(100.0, 0.0, 0.0));
        shape.refresh(&frame);

        let ColliderShape::ConvexHull(hull) = &shape else {
            unreachable!()
        };
        for v in &hull.world_vertices {
            assert!(v.length() < 2.0, "vertex escaped offset form: {v:?}");
        }
    }

    #[test]
    fn test_ray_direction_ignores_scale() {
        let mut shape = ColliderShape::ray(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut frame = FrameOfReference::identity();
        frame.scale = Vec3::new(5.0, 5.0, 5.0);
        shape.refresh(&frame);

        let ColliderShape::Ray(ray) = &shape else {
            unreachable!()
        };
        assert!((ray.world_direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cuboid_furthest_vertices() {
        let mut hull = ConvexHullCollider::cuboid(Vec3::ONE);
        let mut shape = ColliderShape::convex_hull(hull.clone());
        shape.refresh(&FrameOfReference::identity());
        let ColliderShape::ConvexHull(refreshed) = &shape else {
            unreachable!()
        };
        hull = refreshed.clone();

        // Whole +y face: four vertices.
        assert_eq!(hull.furthest_vertices(Vec3::Y).len(), 4);
        // Corner direction: one vertex.
        assert_eq!(hull.furthest_vertices(Vec3::ONE.normalize()).len(), 1);
        // Edge direction: two vertices.
        assert_eq!(
            hull.furthest_vertices(Vec3::new(1.0, 1.0, 0.0).normalize())
                .len(),
            2
        );
    }
}
