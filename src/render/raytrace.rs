//! The shadow + local illumination kernel program.

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
const RAYTRACE_SHADER: &str = include_str!("shaders/raytrace.wgsl");

/// Casts per-pixel shadow rays against the collider caches and computes the
/// Blinn-Phong local illumination for the directional and point lights.
pub struct RayTraceKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
}

impl RayTraceKernel {
    pub fn new(
        ctx: &WgpuContext,
        ray_buffer: &RayBuffer,
        global_buffer: &GlobalBuffer,
        scene: &SceneBuffers,
    ) -> Result<Self, EngineError> {
        let layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("raytrace layout"),
                entries: &[
                    texture_entry(0),
                    texture_entry(1),
                    texture_entry(2),
                    texture_entry(3),
                    texture_entry(4),
                    storage_texture_entry(5, wgpu::TextureFormat::R32Float),
                    storage_texture_entry(6, wgpu::TextureFormat::Rgba8Unorm),
                    storage_texture_entry(7, wgpu::TextureFormat::Rgba8Unorm),
                ],
            });

        let source = format!("{SCENE_SHADER}\n{RAYTRACE_SHADER}");
        let pipeline = ComputePipelineBuilder::new(ctx, "raytrace kernel")
            .shader(&source)
            .entry("main")
            .bind_group_layout(&layout)
            .bind_group_layout(scene.layout())
            .build()?;

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("raytrace bind group"),
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
                    resource: wgpu::BindingResource::TextureView(ray_buffer.albedo.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(ray_buffer.material.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(ray_buffer.specular.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(ray_buffer.shadow.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::TextureView(global_buffer.local.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: wgpu::BindingResource::TextureView(ray_buffer.final_image.view()),
                },
            ],
        });

        Ok(Self {
            pipeline,
            bind_group,
        })
    }
}

impl KernelProgram for RayTraceKernel {
    fn label(&self) -> &'static str {
        "raytrace"
    }

    fn execute(&self, ctx: &WgpuContext, scene: &SceneBuffers, params: &KernelParams) {
        ComputeDispatcher::new(ctx).dispatch_image(
            &self.pipeline,
            &[&self.bind_group, scene.bind_group()],
            params.width,
            params.height,
            WORKGROUP_SIZE,
            Some("raytrace"),
        );
    }
}
