//! The engine: tick orchestration over simulation and rendering.
//!
//! Each tick runs, in total order: behaviour update → gravity → collider
//! cache refresh + detection → impulse resolution → add/delete queue sweep →
//! integration. Rendering consumes the collider caches refreshed at
//! detection time; they are immutable for the rest of the tick.

use glam::{Mat4, Vec3};

use crate::assets::AssetStore;
use crate::collision::{Aabb, Collision, CollisionWorld};
use crate::context::WgpuContext;
use crate::error::EngineError;
use crate::physics::{self, PhysicsConfig};
use crate::render::{
    Camera, DirectionalLight, DrawItem, FrameInput, RayTracerPipeline, SceneDescription,
};
use crate::scene::{Globals, ScenePool};

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    /// Extent of the oct tree's world bounds.
    pub world_bounds: Aabb,
    /// Fixed subdivision depth of the oct tree.
    pub octree_depth: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            world_bounds: Aabb {
                min: Vec3::splat(-64.0),
                max: Vec3::splat(64.0),
            },
            octree_depth: 3,
        }
    }
}

/// The engine: scene, assets, global state, collision world, and the
/// optional render pipeline.
pub struct Engine {
    pub scene: ScenePool,
    pub assets: AssetStore,
    pub globals: Globals,
    collision: CollisionWorld,
    pipeline: Option<RayTracerPipeline>,
}

impl Engine {
    /// Create a simulation-only engine; call [`init_renderer`] to attach the
    /// GPU pipeline.
    ///
    /// [`init_renderer`]: Engine::init_renderer
    pub fn new(config: EngineConfig) -> Self {
        let mut globals = Globals::new();
        globals.gravity = config.physics.gravity;
        Self {
            scene: ScenePool::new(),
            assets: AssetStore::new(),
            globals,
            collision: CollisionWorld::new(config.world_bounds, config.octree_depth),
            pipeline: None,
        }
    }

    /// Build the render pipeline for the given output dimensions. Fatal on
    /// kernel build failure; the caller logs and exits.
    pub fn init_renderer(
        &mut self,
        ctx: &WgpuContext,
        width: u32,
        height: u32,
        target_format: wgpu::TextureFormat,
    ) -> Result<(), EngineError> {
        self.pipeline = Some(RayTracerPipeline::new(ctx, width, height, target_format)?);
        Ok(())
    }

    /// Whether the engine loop should keep running.
    pub fn is_running(&self) -> bool {
        self.globals.running
    }

    /// Request a graceful stop at the next tick boundary.
    pub fn stop(&mut self) {
        self.globals.running = false;
    }

    /// The collisions detected by the most recent tick.
    pub fn collisions(&self) -> &[Collision] {
        self.collision.collisions()
    }

    /// Advance the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.globals.delta = dt;

        // Behaviours observe last tick's collision list.
        let collisions = self.collision.collisions().to_vec();
        self.scene.update(&mut self.globals, &collisions);

        physics::apply_gravity(&mut self.scene, self.globals.gravity);

        self.collision.detect(&mut self.scene);
        physics::resolve(&mut self.scene, self.collision.collisions_mut());

        // Queued additions and deletions land after detection so in-flight
        // collision records stay valid through the resolve.
        self.scene.apply_queues();

        physics::integrate_scene(&mut self.scene, dt);
    }

    /// Render the current scene state into `target`.
    ///
    /// Gathers the draw list, the collider world caches, and the point
    /// lights from the scene; the camera and directional light arrive from
    /// the embedding program. Without an initialized renderer this logs and
    /// returns, leaving the frame untouched.
    pub fn render(
        &mut self,
        ctx: &WgpuContext,
        camera: &Camera,
        directional: &DirectionalLight,
        target: &wgpu::TextureView,
    ) {
        let Some(pipeline) = self.pipeline.as_mut() else {
            tracing::warn!(target: "lucent::engine", "render called before init_renderer");
            return;
        };

        let mut draws = Vec::new();
        let mut scene_description = SceneDescription {
            directional: *directional,
            camera_position: camera.position,
            ..Default::default()
        };

        for id in self.scene.ids() {
            let Some(object) = self.scene.get(id) else {
                continue;
            };

            let material = object
                .material
                .and_then(|m| self.assets.material(m).cloned())
                .unwrap_or_default();

            if let Some(mesh) = object.mesh {
                draws.push(DrawItem {
                    mesh,
                    model: object.frame.to_matrix4(),
                    normal: Mat4::from_mat3(object.frame.rotation),
                    material: material.clone(),
                });
            }

            // The ray-trace kernels consume the same world-space caches the
            // detector used this tick.
            if let Some(collider) = object.collider.as_ref() {
                match &collider.shape {
                    crate::collision::ColliderShape::Sphere(sphere) => {
                        scene_description.push_sphere(
                            sphere.world_centre,
                            sphere.world_radius,
                            &material,
                        );
                    }
                    crate::collision::ColliderShape::Aabb(aabb) => {
                        scene_description.push_aabb(aabb.world.min, aabb.world.max, &material);
                    }
                    _ => {}
                }
            }

            if let Some(light) = object.light.as_ref() {
                scene_description.push_point_light(object.frame.position + light.offset, light);
            }
        }

        pipeline.render(
            ctx,
            &FrameInput {
                camera,
                scene: &scene_description,
                draws: &draws,
                assets: &self.assets,
            },
            target,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Collider, ColliderShape};
    use crate::frame::FrameOfReference;
    use crate::physics::RigidBody;
    use crate::scene::{Behaviour, GameObject, TickContext};

    fn falling_sphere(height: f32) -> GameObject {
        let mut object =
            GameObject::new(FrameOfReference::from_position(Vec3::new(0.0, height, 0.0)));
        let mut body = RigidBody::dynamic(1.0, RigidBody::sphere_inertia(1.0, 0.5));
        body.restitution = 0.0;
        object.body = Some(body);
        object.collider = Some(Collider::new(ColliderShape::sphere(Vec3::ZERO, 0.5)));
        object
    }

    fn ground() -> GameObject {
        let mut object = GameObject::new(FrameOfReference::identity());
        let mut body = RigidBody::immovable();
        body.restitution = 0.0;
        object.body = Some(body);
        object.collider = Some(Collider::new(ColliderShape::aabb(
            Vec3::new(-10.0, -1.0, -10.0),
            Vec3::new(10.0, 0.0, 10.0),
        )));
        object
    }

    #[test]
    fn test_tick_simulates_fall_and_contact() {
        let mut engine = Engine::new(EngineConfig::default());
        let sphere = engine.scene.spawn(falling_sphere(3.0));
        engine.scene.spawn(ground());

        for _ in 0..2000 {
            engine.tick(1e-3);
        }

        let object = engine.scene.get(sphere).unwrap();
        // Settled on the slab, not fallen through.
        assert!(
            (object.frame.position.y - 0.5).abs() < 0.05,
            "rest height {}",
            object.frame.position.y
        );
        assert!(!engine.collisions().is_empty());
    }

    #[test]
    fn test_stop_clears_running_flag() {
        let mut engine = Engine::new(EngineConfig::default());
        assert!(engine.is_running());
        engine.stop();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_behaviours_see_last_tick_collisions() {
        struct CountContacts {
            seen: std::rc::Rc<std::cell::Cell<usize>>,
        }
        impl Behaviour for CountContacts {
            fn update(&mut self, _object: &mut GameObject, ctx: &mut TickContext) -> bool {
                self.seen.set(self.seen.get().max(ctx.collisions.len()));
                true
            }
        }

        let seen = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut engine = Engine::new(EngineConfig::default());
        // Spawned already overlapping the slab so the first tick detects it.
        let mut sphere = falling_sphere(0.45);
        sphere.behaviours.push(Box::new(CountContacts {
            seen: seen.clone(),
        }));
        engine.scene.spawn(sphere);
        engine.scene.spawn(ground());

        engine.tick(1e-3); // contact detected this tick
        engine.tick(1e-3); // behaviour observes it the next tick
        assert!(seen.get() > 0, "behaviour never saw a collision");
    }

    #[test]
    fn test_spawned_objects_join_after_detection() {
        struct SpawnOne {
            done: bool,
        }
        impl Behaviour for SpawnOne {
            fn update(&mut self, _object: &mut GameObject, ctx: &mut TickContext) -> bool {
                if !self.done {
                    ctx.spawn(GameObject::new(FrameOfReference::identity()));
                    self.done = true;
                }
                true
            }
        }

        let mut engine = Engine::new(EngineConfig::default());
        let mut object = GameObject::new(FrameOfReference::identity());
        object.behaviours.push(Box::new(SpawnOne { done: false }));
        engine.scene.spawn(object);

        assert_eq!(engine.scene.len(), 1);
        engine.tick(1e-3);
        assert_eq!(engine.scene.len(), 2);
    }
}
