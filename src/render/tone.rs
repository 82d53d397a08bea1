//! The tone reproduction kernel program: two-pass Reinhard operator.

use bytemuck::{Pod, Zeroable};

use crate::compute::{compute_workgroup_count, ComputeDispatcher};
use crate::context::WgpuContext;
use crate::core::{ComputePipelineBuilder, StorageBuffer, UniformBuffer};
use crate::error::EngineError;
use crate::render::global_buffer::GlobalBuffer;
use crate::render::kernel::{
    storage_texture_entry, texture_entry, KernelParams, KernelProgram, SceneBuffers,
    WORKGROUP_SIZE,
};

const TONE_SHADER: &str = include_str!("shaders/tone.wgsl");

/// Tile edge of the log-luminance reduction.
const TILE: u32 = 16;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ToneParams {
    /// x = key value, y = white point, z = partial count.
    params: [f32; 4],
}

/// Reduces the frame to a log-average luminance, then applies
/// `L' = L (1 + L/Lw^2) / (1 + L)` to the combined local + reflection +
/// transmission color and writes the final image.
pub struct ToneKernel {
    log_pipeline: wgpu::ComputePipeline,
    reduce_pipeline: wgpu::ComputePipeline,
    map_pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    #[allow(dead_code)]
    uniform: UniformBuffer<ToneParams>,
    #[allow(dead_code)]
    partials: StorageBuffer,
    #[allow(dead_code)]
    average: StorageBuffer,
}

impl ToneKernel {
    /// The key value of the Reinhard operator.
    pub const KEY: f32 = 0.18;
    /// The luminance that maps to pure white.
    pub const WHITE: f32 = 2.0;

    pub fn new(
        ctx: &WgpuContext,
        global_buffer: &GlobalBuffer,
        width: u32,
        height: u32,
    ) -> Result<Self, EngineError> {
        let tiles_x = compute_workgroup_count(width, TILE);
        let tiles_y = compute_workgroup_count(height, TILE);
        let partial_count = tiles_x * tiles_y;

        let uniform = UniformBuffer::new(
            ctx,
            &ToneParams {
                params: [Self::KEY, Self::WHITE, partial_count as f32, 0.0],
            },
            Some("tone params"),
        );
        let partials = StorageBuffer::new(ctx, partial_count as u64 * 8, Some("tone partials"));
        let average = StorageBuffer::new(ctx, 8, Some("tone average"));

        let storage_buffer_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: false },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("tone layout"),
                entries: &[
                    texture_entry(0),
                    texture_entry(1),
                    texture_entry(2),
                    texture_entry(3),
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    storage_buffer_entry(5),
                    storage_buffer_entry(6),
                    storage_texture_entry(7, wgpu::TextureFormat::Rgba8Unorm),
                ],
            });

        let build = |entry| {
            ComputePipelineBuilder::new(ctx, "tone reproduction kernel")
                .shader(TONE_SHADER)
                .entry(entry)
                .bind_group_layout(&layout)
                .build()
        };
        let log_pipeline = build("log_luminance")?;
        let reduce_pipeline = build("reduce")?;
        let map_pipeline = build("map")?;

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tone bind group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(global_buffer.local.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(global_buffer.reflection.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(global_buffer.transmission.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(
                        global_buffer.global_material.view(),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: uniform.binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: partials.binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: average.binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: wgpu::BindingResource::TextureView(global_buffer.final_image.view()),
                },
            ],
        });

        Ok(Self {
            log_pipeline,
            reduce_pipeline,
            map_pipeline,
            bind_group,
            uniform,
            partials,
            average,
        })
    }
}

impl KernelProgram for ToneKernel {
    fn label(&self) -> &'static str {
        "tone reproduction"
    }

    fn execute(&self, ctx: &WgpuContext, _scene: &SceneBuffers, params: &KernelParams) {
        let dispatcher = ComputeDispatcher::new(ctx);
        let groups = [&self.bind_group];

        // Pass 1: per-tile log-luminance partial sums.
        dispatcher.dispatch(
            &self.log_pipeline,
            &groups,
            [
                compute_workgroup_count(params.width, TILE),
                compute_workgroup_count(params.height, TILE),
                1,
            ],
            Some("tone log"),
        );
        // Pass 2: collapse the partials to the global average.
        dispatcher.dispatch(&self.reduce_pipeline, &groups, [1, 1, 1], Some("tone reduce"));
        // Pass 3: apply the operator per pixel.
        dispatcher.dispatch_image(
            &self.map_pipeline,
            &groups,
            params.width,
            params.height,
            WORKGROUP_SIZE,
            Some("tone map"),
        );
    }
}
