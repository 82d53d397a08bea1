//! Lucent 3D Engine
//!
//! A small real-time engine that couples impulse-based rigid body physics
//! with a hybrid raster + GPU-compute ray-traced renderer, built on wgpu.
//!
//! # Architecture
//!
//! The library is organized into layers, leaves first:
//!
//! 1. **math** - rotor/multivector algebra and projection helpers over glam
//! 2. **frame** - position + rotation + non-uniform scale per entity
//! 3. **collision** - collider variants, oct-tree broad phase, SAT narrow phase
//! 4. **physics** - rigid body state, impulse resolver, semi-implicit Euler
//! 5. **context** - core wgpu wrapper (Device, Queue)
//! 6. **core** - GPU primitives (buffers, textures, pipelines)
//! 7. **compute** - compute shader dispatch utilities
//! 8. **render** - G-buffer aggregates, ray-trace kernels, tone map, blit
//! 9. **assets** - mesh and material stores addressed by opaque id
//! 10. **scene** - pooled game objects, behaviour states, global state
//! 11. **engine** - the tick loop tying simulation and rendering together

pub mod assets;
pub mod collision;
pub mod compute;
pub mod context;
pub mod core;
pub mod engine;
pub mod error;
pub mod frame;
pub mod math;
pub mod physics;
pub mod render;
pub mod scene;

// Re-export commonly used types
pub use context::WgpuContext;

pub use self::core::{
    BlendState, ComputePipelineBuilder, CullState, DepthState, IndexBuffer, PipelineBuilder,
    RawUniformBuffer, StorageBuffer, Texture2D, UniformBuffer, VertexBuffer, VertexPN,
};

pub use assets::{AssetStore, Material, MaterialId, Mesh, MeshData, MeshId};
pub use collision::{Collider, ColliderShape, Collision, CollisionWorld, OctTree};
pub use compute::{compute_workgroup_count, read_back, ComputeDispatcher};
pub use engine::{Engine, EngineConfig};
pub use error::EngineError;
pub use frame::FrameOfReference;
pub use math::{Multivector, Rotor};
pub use physics::{PhysicsConfig, RigidBody};
pub use render::{Camera, DirectionalLight, GlobalBuffer, PointLight, RayBuffer, RayTracerPipeline};
pub use scene::{Behaviour, GameObject, Globals, ObjectId, ScenePool, TickContext};

// Re-export glam for convenience
pub use glam;
