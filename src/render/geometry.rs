//! Geometry pass: rasterise every visible object into the RayBuffer and
//! GlobalBuffer material targets.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::assets::{AssetStore, Material, MeshId};
use crate::context::WgpuContext;
use crate::core::{CullState, DepthState, PipelineBuilder, RawUniformBuffer, UniformBuffer, VertexPN};
use crate::error::EngineError;
use crate::render::camera::Camera;
use crate::render::global_buffer::GlobalBuffer;
use crate::render::ray_buffer::RayBuffer;

/// Largest number of draws a single frame can carry.
const MAX_DRAWS: u64 = 1024;
/// Dynamic-offset stride; must satisfy the device's uniform alignment.
const MODEL_STRIDE: u64 = 256;

const GEOMETRY_SHADER: &str = include_str!("shaders/geometry.wgsl");

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct CameraUniform {
    view_projection: [[f32; 4]; 4],
    position: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
    /// Rotation-only matrix for transforming normals.
    normal: [[f32; 4]; 4],
    albedo: [f32; 4],
    material: [f32; 4],
    specular_tint: [f32; 4],
    global_material: [f32; 4],
    trans_material: [f32; 4],
}

/// One object to rasterise this frame.
pub struct DrawItem {
    pub mesh: MeshId,
    pub model: Mat4,
    pub normal: Mat4,
    pub material: Material,
}

/// The raster stage writing the G-buffer.
pub struct GeometryPass {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: UniformBuffer<CameraUniform>,
    camera_bind_group: wgpu::BindGroup,
    model_buffer: RawUniformBuffer,
    model_bind_group: wgpu::BindGroup,
}

impl GeometryPass {
    pub fn new(ctx: &WgpuContext) -> Result<Self, EngineError> {
        let camera_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("geometry camera layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let model_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("geometry model layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<ModelUniform>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let mut builder = PipelineBuilder::new(ctx, "geometry pass")
            .shader(GEOMETRY_SHADER)
            .vertex_layout(VertexPN::layout())
            .bind_group_layout(&camera_layout)
            .bind_group_layout(&model_layout)
            .depth(DepthState::read_write())
            .cull(CullState::Back);
        for format in RayBuffer::GEOMETRY_FORMATS {
            builder = builder.color_format(format);
        }
        for format in GlobalBuffer::GEOMETRY_FORMATS {
            builder = builder.color_format(format);
        }
        let pipeline = builder.build()?;

        let camera_buffer = UniformBuffer::new(
            ctx,
            &CameraUniform {
                view_projection: Mat4::IDENTITY.to_cols_array_2d(),
                position: [0.0; 4],
            },
            Some("geometry camera"),
        );
        let camera_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("geometry camera bind group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.binding(),
            }],
        });

        let model_buffer = RawUniformBuffer::new(ctx, MAX_DRAWS * MODEL_STRIDE, Some("geometry models"));
        let model_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("geometry model bind group"),
            layout: &model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: model_buffer.buffer(),
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniform>() as u64),
                }),
            }],
        });

        Ok(Self {
            pipeline,
            camera_buffer,
            camera_bind_group,
            model_buffer,
            model_bind_group,
        })
    }

    /// Encode the geometry pass for this frame's draw list.
    pub fn encode(
        &self,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        ray_buffer: &RayBuffer,
        global_buffer: &GlobalBuffer,
        camera: &Camera,
        assets: &AssetStore,
        draws: &[DrawItem],
    ) {
        self.camera_buffer.update(
            ctx,
            &CameraUniform {
                view_projection: camera.view_projection().to_cols_array_2d(),
                position: camera.position.extend(1.0).to_array(),
            },
        );

        let draws = if draws.len() as u64 > MAX_DRAWS {
            tracing::warn!(
                target: "lucent::render",
                count = draws.len(),
                "draw list exceeds capacity, truncating"
            );
            &draws[..MAX_DRAWS as usize]
        } else {
            draws
        };

        for (index, draw) in draws.iter().enumerate() {
            let uniform = ModelUniform {
                model: draw.model.to_cols_array_2d(),
                normal: draw.normal.to_cols_array_2d(),
                albedo: draw.material.albedo.to_array(),
                material: [
                    draw.material.ambient,
                    draw.material.diffuse,
                    draw.material.specular,
                    draw.material.shininess,
                ],
                specular_tint: draw.material.specular_tint.to_array(),
                global_material: [
                    draw.material.reflectivity,
                    draw.material.transmissivity,
                    draw.material.refractive_index,
                    0.0,
                ],
                trans_material: draw.material.albedo.to_array(),
            };
            self.model_buffer
                .write_at(ctx, index as u64 * MODEL_STRIDE, &uniform);
        }

        // Every target clears to zero; the position alpha flags covered
        // pixels, and background color is applied at tone reproduction.
        let clear = wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT);
        let ray_attachments = ray_buffer.geometry_attachments(clear);
        let global_attachments = global_buffer.geometry_attachments(clear);
        let mut attachments: Vec<Option<wgpu::RenderPassColorAttachment>> = Vec::new();
        attachments.extend(ray_attachments);
        attachments.extend(global_attachments);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("geometry pass"),
            color_attachments: &attachments,
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ray_buffer.depth.view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        for (index, draw) in draws.iter().enumerate() {
            let Some(mesh) = assets.mesh(draw.mesh) else {
                tracing::warn!(target: "lucent::render", "draw references missing mesh, skipping");
                continue;
            };
            pass.set_bind_group(
                1,
                &self.model_bind_group,
                &[(index as u64 * MODEL_STRIDE) as u32],
            );
            mesh.draw(&mut pass);
        }
    }
}
