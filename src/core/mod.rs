//! GPU primitives: buffers, textures, pipelines, and render states.

pub mod buffer;
pub mod pipeline;
pub mod render_states;
pub mod texture;
pub mod vertex;

pub use buffer::{IndexBuffer, RawUniformBuffer, StorageBuffer, UniformBuffer, VertexBuffer};
pub use pipeline::{ComputePipelineBuilder, PipelineBuilder};
pub use render_states::{BlendState, CullState, DepthState};
pub use texture::{DepthStencilTexture, Texture2D};
pub use vertex::VertexPN;
