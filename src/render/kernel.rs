//! Kernel program infrastructure: the uniform kernel interface and the
//! scene-description buffers every ray-trace kernel reads.
//!
//! The kernels consume the same collider world-space caches the CPU physics
//! uses: sphere centres/radii and AABB extents, uploaded once per frame
//! alongside the lights and camera.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::assets::Material;
use crate::context::WgpuContext;
use crate::core::{StorageBuffer, UniformBuffer};
use crate::render::light::{DirectionalLight, PointLight};

/// Capacity of the per-frame sphere cache buffer.
pub const MAX_SPHERES: usize = 256;
/// Capacity of the per-frame AABB cache buffer.
pub const MAX_AABBS: usize = 256;
/// Maximum point lights per frame.
pub const MAX_POINT_LIGHTS: usize = 8;

/// Compute workgroup edge length for image-sized dispatches.
pub const WORKGROUP_SIZE: u32 = 8;

/// A sphere collider cache plus its surface description.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GpuSphere {
    /// xyz = world centre, w = world radius.
    pub centre_radius: [f32; 4],
    pub albedo: [f32; 4],
    /// ambient / diffuse / specular / shininess.
    pub material: [f32; 4],
    /// k_reflect / k_transmit / k_index.
    pub global: [f32; 4],
}

/// An AABB collider cache plus its surface description.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GpuAabb {
    pub min: [f32; 4],
    pub max: [f32; 4],
    pub albedo: [f32; 4],
    pub material: [f32; 4],
    pub global: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GpuPointLight {
    pub position: [f32; 4],
    pub color: [f32; 4],
    /// constant / linear / quadratic.
    pub attenuation: [f32; 4],
}

/// The per-frame scene uniform shared by every kernel.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SceneUniform {
    pub camera_position: [f32; 4],
    /// Direction the light travels.
    pub light_direction: [f32; 4],
    /// rgb = color, w = ambient intensity.
    pub light_color: [f32; 4],
    /// x = diffuse intensity.
    pub light_params: [f32; 4],
    /// x = sphere count, y = AABB count, z = point light count.
    pub counts: [u32; 4],
    pub point_lights: [GpuPointLight; MAX_POINT_LIGHTS],
}

impl Default for SceneUniform {
    fn default() -> Self {
        Self {
            camera_position: [0.0; 4],
            light_direction: [0.0, -1.0, 0.0, 0.0],
            light_color: [1.0, 1.0, 1.0, 0.1],
            light_params: [1.0, 0.0, 0.0, 0.0],
            counts: [0; 4],
            point_lights: [GpuPointLight::zeroed(); MAX_POINT_LIGHTS],
        }
    }
}

/// CPU-side description of what the kernels trace this frame.
#[derive(Default)]
pub struct SceneDescription {
    pub spheres: Vec<GpuSphere>,
    pub aabbs: Vec<GpuAabb>,
    pub point_lights: Vec<GpuPointLight>,
    pub directional: DirectionalLight,
    pub camera_position: Vec3,
}

impl SceneDescription {
    /// Record a sphere cache with its material.
    pub fn push_sphere(&mut self, centre: Vec3, radius: f32, material: &Material) {
        if self.spheres.len() >= MAX_SPHERES {
            tracing::warn!(target: "lucent::render", "sphere cache buffer full, dropping entry");
            return;
        }
        self.spheres.push(GpuSphere {
            centre_radius: centre.extend(radius).to_array(),
            albedo: material.albedo.to_array(),
            material: [
                material.ambient,
                material.diffuse,
                material.specular,
                material.shininess,
            ],
            global: [
                material.reflectivity,
                material.transmissivity,
                material.refractive_index,
                0.0,
            ],
        });
    }

    /// Record an AABB cache with its material.
    pub fn push_aabb(&mut self, min: Vec3, max: Vec3, material: &Material) {
        if self.aabbs.len() >= MAX_AABBS {
            tracing::warn!(target: "lucent::render", "aabb cache buffer full, dropping entry");
            return;
        }
        self.aabbs.push(GpuAabb {
            min: min.extend(0.0).to_array(),
            max: max.extend(0.0).to_array(),
            albedo: material.albedo.to_array(),
            material: [
                material.ambient,
                material.diffuse,
                material.specular,
                material.shininess,
            ],
            global: [
                material.reflectivity,
                material.transmissivity,
                material.refractive_index,
                0.0,
            ],
        });
    }

    /// Record a point light at a world position.
    pub fn push_point_light(&mut self, position: Vec3, light: &PointLight) {
        if self.point_lights.len() >= MAX_POINT_LIGHTS {
            tracing::warn!(target: "lucent::render", "point light buffer full, dropping entry");
            return;
        }
        self.point_lights.push(GpuPointLight {
            position: position.extend(1.0).to_array(),
            color: light.color.extend(1.0).to_array(),
            attenuation: [
                light.attenuation.constant,
                light.attenuation.linear,
                light.attenuation.quadratic,
                0.0,
            ],
        });
    }
}

/// GPU residency for the frame's scene description, with the shared bind
/// group every kernel attaches as its second group.
pub struct SceneBuffers {
    uniform: UniformBuffer<SceneUniform>,
    spheres: StorageBuffer,
    aabbs: StorageBuffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl SceneBuffers {
    pub fn new(ctx: &WgpuContext) -> Self {
        let uniform = UniformBuffer::new(ctx, &SceneUniform::default(), Some("scene uniform"));
        let spheres = StorageBuffer::new(
            ctx,
            (MAX_SPHERES * std::mem::size_of::<GpuSphere>()) as u64,
            Some("scene spheres"),
        );
        let aabbs = StorageBuffer::new(
            ctx,
            (MAX_AABBS * std::mem::size_of::<GpuAabb>()) as u64,
            Some("scene aabbs"),
        );

        let storage_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("scene layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    storage_entry(1),
                    storage_entry(2),
                ],
            });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene bind group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: spheres.binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: aabbs.binding(),
                },
            ],
        });

        Self {
            uniform,
            spheres,
            aabbs,
            layout,
            bind_group,
        }
    }

    /// Upload this frame's description.
    pub fn upload(&self, ctx: &WgpuContext, scene: &SceneDescription) {
        let mut uniform = SceneUniform {
            camera_position: scene.camera_position.extend(1.0).to_array(),
            light_direction: scene.directional.direction.normalize_or_zero().extend(0.0).to_array(),
            light_color: Vec4::new(
                scene.directional.color.x,
                scene.directional.color.y,
                scene.directional.color.z,
                scene.directional.ambient_intensity,
            )
            .to_array(),
            light_params: [scene.directional.diffuse_intensity, 0.0, 0.0, 0.0],
            counts: [
                scene.spheres.len() as u32,
                scene.aabbs.len() as u32,
                scene.point_lights.len() as u32,
                0,
            ],
            ..Default::default()
        };
        for (slot, light) in uniform.point_lights.iter_mut().zip(&scene.point_lights) {
            *slot = *light;
        }
        self.uniform.update(ctx, &uniform);

        if !scene.spheres.is_empty() {
            self.spheres.write(ctx, &scene.spheres);
        }
        if !scene.aabbs.is_empty() {
            self.aabbs.write(ctx, &scene.aabbs);
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Per-dispatch parameters handed to a kernel program.
pub struct KernelParams {
    pub width: u32,
    pub height: u32,
}

/// The uniform interface every kernel program implements.
///
/// Construction is initialisation (the program builds its pipelines and
/// private buffers, failing fatally on a build error); `execute` enqueues
/// the kernel for one frame; dropping the program releases its resources.
pub trait KernelProgram {
    fn label(&self) -> &'static str;

    /// Enqueue this kernel's dispatches for the current frame.
    fn execute(&self, ctx: &WgpuContext, scene: &SceneBuffers, params: &KernelParams);
}

/// Bind group layout entry for a sampled G-buffer texture.
pub(crate) fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Bind group layout entry for a write-only storage texture.
pub(crate) fn storage_texture_entry(
    binding: u32,
    format: wgpu::TextureFormat,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::StorageTexture {
            access: wgpu::StorageTextureAccess::WriteOnly,
            format,
            view_dimension: wgpu::TextureViewDimension::D2,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_description_respects_capacity() {
        let mut scene = SceneDescription::default();
        let material = Material::default();
        for i in 0..(MAX_SPHERES + 10) {
            scene.push_sphere(Vec3::splat(i as f32), 1.0, &material);
        }
        assert_eq!(scene.spheres.len(), MAX_SPHERES);
    }

    #[test]
    fn test_gpu_struct_sizes_are_aligned() {
        // std430-compatible strides.
        assert_eq!(std::mem::size_of::<GpuSphere>() % 16, 0);
        assert_eq!(std::mem::size_of::<GpuAabb>() % 16, 0);
        assert_eq!(std::mem::size_of::<GpuPointLight>() % 16, 0);
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
    }
}
