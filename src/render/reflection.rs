//! The reflection kernel program: per-collider-class trace passes plus the
//! min-distance merge reduction.

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
const REFLECTION_SHADER: &str = include_str!("shaders/reflection.wgsl");

/// Traces one reflection bounce into two per-class intermediate textures
/// and merges them per-pixel by smallest hit distance.
pub struct ReflectionKernel {
    trace_spheres: wgpu::ComputePipeline,
    trace_aabbs: wgpu::ComputePipeline,
    merge: wgpu::ComputePipeline,
    trace_bind_group: wgpu::BindGroup,
    merge_bind_group: wgpu::BindGroup,
}

impl ReflectionKernel {
    pub fn new(
        ctx: &WgpuContext,
        ray_buffer: &RayBuffer,
        global_buffer: &GlobalBuffer,
        scene: &SceneBuffers,
    ) -> Result<Self, EngineError> {
        let trace_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("reflection trace layout"),
                entries: &[
                    texture_entry(0),
                    texture_entry(1),
                    texture_entry(2),
                    storage_texture_entry(3, wgpu::TextureFormat::Rgba16Float),
                    storage_texture_entry(4, wgpu::TextureFormat::Rgba16Float),
                ],
            });
        let merge_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("reflection merge layout"),
                entries: &[
                    texture_entry(5),
                    texture_entry(6),
                    storage_texture_entry(7, wgpu::TextureFormat::Rgba8Unorm),
                ],
            });

        let source = format!("{SCENE_SHADER}\n{REFLECTION_SHADER}");
        let build = |entry| {
            ComputePipelineBuilder::new(ctx, "reflection kernel")
                .shader(&source)
                .entry(entry)
                .bind_group_layout(&trace_layout)
                .bind_group_layout(scene.layout())
                .build()
        };
        let trace_spheres = build("reflect_spheres")?;
        let trace_aabbs = build("reflect_aabbs")?;
        let merge = ComputePipelineBuilder::new(ctx, "reflection merge kernel")
            .shader(&source)
            .entry("merge")
            .bind_group_layout(&merge_layout)
            .build()?;

        let trace_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("reflection trace bind group"),
            layout: &trace_layout,
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
                        global_buffer.reflection_spheres.view(),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(
                        global_buffer.reflection_aabbs.view(),
                    ),
                },
            ],
        });
        let merge_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("reflection merge bind group"),
            layout: &merge_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(
                        global_buffer.reflection_spheres.view(),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::TextureView(
                        global_buffer.reflection_aabbs.view(),
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: wgpu::BindingResource::TextureView(global_buffer.reflection.view()),
                },
            ],
        });

        Ok(Self {
            trace_spheres,
            trace_aabbs,
            merge,
            trace_bind_group,
            merge_bind_group,
        })
    }
}

impl KernelProgram for ReflectionKernel {
    fn label(&self) -> &'static str {
        "reflection"
    }

    fn execute(&self, ctx: &WgpuContext, scene: &SceneBuffers, params: &KernelParams) {
        let dispatcher = ComputeDispatcher::new(ctx);
        let groups = [&self.trace_bind_group, scene.bind_group()];
        dispatcher.dispatch_image(
            &self.trace_spheres,
            &groups,
            params.width,
            params.height,
            WORKGROUP_SIZE,
            Some("reflection spheres"),
        );
        dispatcher.dispatch_image(
            &self.trace_aabbs,
            &groups,
            params.width,
            params.height,
            WORKGROUP_SIZE,
            Some("reflection aabbs"),
        );
        dispatcher.dispatch_image(
            &self.merge,
            &[&self.merge_bind_group],
            params.width,
            params.height,
            WORKGROUP_SIZE,
            Some("reflection merge"),
        );
    }
}
