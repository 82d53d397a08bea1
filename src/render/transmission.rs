//! The transmission kernel program (sphere-only refraction pass).

use crate::compute::ComputeDispatcher;
use crate::context::WgpuContext;
use crate::core::ComputePipelineBuilder;
use crate::error::EngineError;
use crate::render::global_buffer::GlobalBuffer;
use crate::render::kernel::{
    storage_texture_entry, texture_entry, KernelParams, KernelProgram, SceneBuffers,
    WORKGROUP_SIZE,
};
use crate::render::ray_buffer::RayBuffer;

const SCENE_SHADER: &str = include_str!("shaders/scene.wgsl");
const TRANSMISSION_SHADER: &str = include_str!("shaders/transmission.wgsl");

/// Refracts the view ray through transmissive surfaces and shades what it
/// reaches behind them. Spheres only; the AABB transmission path is absent
/// by design.
pub struct TransmissionKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
}

impl TransmissionKernel {
    pub fn new(
        ctx: &WgpuContext,
        ray_buffer: &RayBuffer,
        global_buffer: &GlobalBuffer,
        scene: &SceneBuffers,
    ) -> Result<Self, EngineError> {
        let layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("transmission layout"),
                entries: &[
                    texture_entry(0),
                    texture_entry(1),
                    texture_entry(2),
                    texture_entry(3),
                    storage_texture_entry(4, wgpu::TextureFormat::Rgba8Unorm),
                ],
            });

        let source = format!("{SCENE_SHADER}\n{TRANSMISSION_SHADER}");
        let pipeline = ComputePipelineBuilder::new(ctx, "transmission kernel")
            .shader(&source)
            .entry("main")
            .bind_group_layout(&layout)
            .bind_group_layout(scene.layout())
            .build()?;

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("transmission bind group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(ray_buffer.position.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(ray_buffer.normal.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(
                        global_buffer.global_material.view(),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(
                        global_buffer.trans_material.view(),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(global_buffer.transmission.view()),
                },
            ],
        });

        Ok(Self {
            pipeline,
            bind_group,
        })
    }
}

impl KernelProgram for TransmissionKernel {
    fn label(&self) -> &'static str {
        "transmission"
    }

    fn execute(&self, ctx: &WgpuContext, scene: &SceneBuffers, params: &KernelParams) {
        ComputeDispatcher::new(ctx).dispatch_image(
            &self.pipeline,
            &[&self.bind_group, scene.bind_group()],
            params.width,
            params.height,
            WORKGROUP_SIZE,
            Some("transmission"),
        );
    }
}
