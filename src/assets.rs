//! Mesh and material stores addressed by opaque id.
//!
//! Asset loading from disk is the embedding program's concern; the engine is
//! handed indexed vertex/index data and material records and refers to them
//! by id from then on.

use glam::{Vec3, Vec4};

use crate::context::WgpuContext;
use crate::core::{IndexBuffer, VertexBuffer, VertexPN};

/// Opaque handle to a stored mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(u32);

/// Opaque handle to a stored material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(u32);

/// CPU-side mesh data: interleaved vertices plus a triangle index list.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<VertexPN>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// An axis-aligned cuboid with face normals.
    pub fn cuboid(half: Vec3) -> Self {
        let h = half;
        let face = |normal: [f32; 3], corners: [[f32; 3]; 4]| {
            corners.map(|c| VertexPN::new(c, normal))
        };

        let faces = [
            // +x
            face(
                [1.0, 0.0, 0.0],
                [
                    [h.x, -h.y, -h.z],
                    [h.x, h.y, -h.z],
                    [h.x, h.y, h.z],
                    [h.x, -h.y, h.z],
                ],
            ),
            // -x
            face(
                [-1.0, 0.0, 0.0],
                [
                    [-h.x, -h.y, h.z],
                    [-h.x, h.y, h.z],
                    [-h.x, h.y, -h.z],
                    [-h.x, -h.y, -h.z],
                ],
            ),
            // +y
            face(
                [0.0, 1.0, 0.0],
                [
                    [-h.x, h.y, -h.z],
                    [-h.x, h.y, h.z],
                    [h.x, h.y, h.z],
                    [h.x, h.y, -h.z],
                ],
            ),
            // -y
            face(
                [0.0, -1.0, 0.0],
                [
                    [-h.x, -h.y, h.z],
                    [-h.x, -h.y, -h.z],
                    [h.x, -h.y, -h.z],
                    [h.x, -h.y, h.z],
                ],
            ),
            // +z
            face(
                [0.0, 0.0, 1.0],
                [
                    [h.x, -h.y, h.z],
                    [h.x, h.y, h.z],
                    [-h.x, h.y, h.z],
                    [-h.x, -h.y, h.z],
                ],
            ),
            // -z
            face(
                [0.0, 0.0, -1.0],
                [
                    [-h.x, -h.y, -h.z],
                    [-h.x, h.y, -h.z],
                    [h.x, h.y, -h.z],
                    [h.x, -h.y, -h.z],
                ],
            ),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for f in faces {
            let base = vertices.len() as u32;
            vertices.extend_from_slice(&f);
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self { vertices, indices }
    }

    /// A UV sphere with the given radius and resolution.
    pub fn uv_sphere(radius: f32, stacks: u32, slices: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for stack in 0..=stacks {
            let phi = std::f32::consts::PI * stack as f32 / stacks as f32;
            for slice in 0..=slices {
                let theta = 2.0 * std::f32::consts::PI * slice as f32 / slices as f32;
                let normal = [
                    phi.sin() * theta.cos(),
                    phi.cos(),
                    phi.sin() * theta.sin(),
                ];
                let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
                vertices.push(VertexPN::new(position, normal));
            }
        }

        let ring = slices + 1;
        for stack in 0..stacks {
            for slice in 0..slices {
                let a = stack * ring + slice;
                let b = a + ring;
                indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }
        Self { vertices, indices }
    }
}

/// A GPU-resident mesh.
pub struct Mesh {
    pub(crate) vertex_buffer: VertexBuffer,
    pub(crate) index_buffer: IndexBuffer,
    pub(crate) index_count: u32,
}

impl Mesh {
    /// Upload mesh data to the GPU.
    pub fn new(ctx: &WgpuContext, data: &MeshData, label: Option<&str>) -> Self {
        Self {
            vertex_buffer: VertexBuffer::new(ctx, &data.vertices, label),
            index_buffer: IndexBuffer::new_u32(ctx, &data.indices, label),
            index_count: data.indices.len() as u32,
        }
    }

    /// Bind and draw this mesh into the active render pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice());
        pass.set_index_buffer(self.index_buffer.slice(), self.index_buffer.format());
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Surface description consumed by the geometry pass and the ray-trace
/// kernels.
#[derive(Debug, Clone)]
pub struct Material {
    /// Base surface color.
    pub albedo: Vec4,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
    /// Tint applied to specular highlights.
    pub specular_tint: Vec4,
    /// Fraction of incoming radiance reflected by the global pass.
    pub reflectivity: f32,
    /// Fraction of incoming radiance transmitted through the surface.
    pub transmissivity: f32,
    /// Refractive index of the medium behind the surface.
    pub refractive_index: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: Vec4::ONE,
            ambient: 0.1,
            diffuse: 0.8,
            specular: 0.5,
            shininess: 32.0,
            specular_tint: Vec4::ONE,
            reflectivity: 0.0,
            transmissivity: 0.0,
            refractive_index: 1.0,
        }
    }
}

/// Storage for meshes and materials, addressed by opaque id.
#[derive(Default)]
pub struct AssetStore {
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self {
            meshes: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Upload and store a mesh, returning its id.
    pub fn add_mesh(&mut self, ctx: &WgpuContext, data: &MeshData, label: Option<&str>) -> MeshId {
        self.meshes.push(Mesh::new(ctx, data, label));
        MeshId(self.meshes.len() as u32 - 1)
    }

    /// Store a material record, returning its id.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() as u32 - 1)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0 as usize)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }
}
