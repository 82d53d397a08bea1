//! GlobalBuffer: the second framebuffer aggregate holding the global
//! illumination intermediates and the tone-mapped final image.

use crate::context::WgpuContext;
use crate::core::Texture2D;

/// Targets of the ray-trace, reflection, transmission, and tone kernels.
///
/// `global_material` (reflect/transmit coefficients and refractive index)
/// and `trans_material` (the transmitted medium's surface description) are
/// raster-written by the geometry pass; the rest are kernel-written.
pub struct GlobalBuffer {
    /// Local-lit color, kernel-written, RGBA8.
    pub local: Texture2D,
    /// Per-collider-class reflection intermediates; alpha carries the hit
    /// distance for the merge kernel.
    pub reflection_spheres: Texture2D,
    pub reflection_aabbs: Texture2D,
    /// Merged reflection radiance, RGBA8.
    pub reflection: Texture2D,
    /// Transmission radiance, RGBA8.
    pub transmission: Texture2D,
    /// k_reflect / k_transmit / k_index, RGBA32F, raster-written.
    pub global_material: Texture2D,
    /// Transmitted-medium material, RGBA32F, raster-written.
    pub trans_material: Texture2D,
    /// Tone-mapped final image, RGBA8.
    pub final_image: Texture2D,
}

impl GlobalBuffer {
    /// The color attachment formats the geometry pass writes here.
    pub const GEOMETRY_FORMATS: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Rgba32Float,
        wgpu::TextureFormat::Rgba32Float,
    ];

    /// Allocate all attachments at the given dimensions.
    pub fn new(ctx: &WgpuContext, width: u32, height: u32) -> Self {
        let kernel = |format, label| Texture2D::kernel_target(ctx, width, height, format, label);
        Self {
            local: kernel(wgpu::TextureFormat::Rgba8Unorm, Some("global local")),
            reflection_spheres: kernel(
                wgpu::TextureFormat::Rgba16Float,
                Some("global reflection spheres"),
            ),
            reflection_aabbs: kernel(
                wgpu::TextureFormat::Rgba16Float,
                Some("global reflection aabbs"),
            ),
            reflection: kernel(wgpu::TextureFormat::Rgba8Unorm, Some("global reflection")),
            transmission: kernel(wgpu::TextureFormat::Rgba8Unorm, Some("global transmission")),
            global_material: Texture2D::render_attachment(
                ctx,
                width,
                height,
                wgpu::TextureFormat::Rgba32Float,
                Some("global material"),
            ),
            trans_material: Texture2D::render_attachment(
                ctx,
                width,
                height,
                wgpu::TextureFormat::Rgba32Float,
                Some("global trans material"),
            ),
            final_image: kernel(wgpu::TextureFormat::Rgba8Unorm, Some("global final")),
        }
    }

    /// The geometry pass color attachments owned by this aggregate.
    pub fn geometry_attachments(
        &self,
        clear: wgpu::LoadOp<wgpu::Color>,
    ) -> [Option<wgpu::RenderPassColorAttachment<'_>>; 2] {
        let attach = |view| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: clear,
                    store: wgpu::StoreOp::Store,
                },
            })
        };
        [attach(self.global_material.view()), attach(self.trans_material.view())]
    }
}
