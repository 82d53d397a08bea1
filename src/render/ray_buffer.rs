//! RayBuffer: the multi-render-target G-buffer of per-pixel surface
//! attributes.

use crate::context::WgpuContext;
use crate::core::{DepthStencilTexture, Texture2D};

/// Per-pixel surface attributes written by the geometry pass and consumed
/// by the ray-trace kernels.
///
/// The position texture's alpha channel flags covered pixels (1) versus
/// background (0). The shadow texture is kernel-written; R8 is not a
/// storage-compatible format on wgpu, so it is held as `R32Float`.
pub struct RayBuffer {
    /// World position, RGBA32F.
    pub position: Texture2D,
    /// Surface albedo, RGBA8.
    pub albedo: Texture2D,
    /// World normal, RGBA32F.
    pub normal: Texture2D,
    /// Local material: ambient/diffuse/specular/shininess, RGBA32F.
    pub material: Texture2D,
    /// Specular tint, RGBA8.
    pub specular: Texture2D,
    /// Directional shadow factor, kernel-written.
    pub shadow: Texture2D,
    /// Locally lit result, kernel-written, RGBA8.
    pub final_image: Texture2D,
    /// Combined depth-stencil attachment.
    pub depth: DepthStencilTexture,
    width: u32,
    height: u32,
}

impl RayBuffer {
    /// The color attachment formats of the geometry pass, in binding order.
    pub const GEOMETRY_FORMATS: [wgpu::TextureFormat; 5] = [
        wgpu::TextureFormat::Rgba32Float,
        wgpu::TextureFormat::Rgba8Unorm,
        wgpu::TextureFormat::Rgba32Float,
        wgpu::TextureFormat::Rgba32Float,
        wgpu::TextureFormat::Rgba8Unorm,
    ];

    /// Allocate all attachments at the given dimensions.
    pub fn new(ctx: &WgpuContext, width: u32, height: u32) -> Self {
        let attach = |format, label| Texture2D::render_attachment(ctx, width, height, format, label);
        Self {
            position: attach(wgpu::TextureFormat::Rgba32Float, Some("ray position")),
            albedo: attach(wgpu::TextureFormat::Rgba8Unorm, Some("ray albedo")),
            normal: attach(wgpu::TextureFormat::Rgba32Float, Some("ray normal")),
            material: attach(wgpu::TextureFormat::Rgba32Float, Some("ray material")),
            specular: attach(wgpu::TextureFormat::Rgba8Unorm, Some("ray specular")),
            shadow: Texture2D::kernel_target(
                ctx,
                width,
                height,
                wgpu::TextureFormat::R32Float,
                Some("ray shadow"),
            ),
            final_image: Texture2D::kernel_target(
                ctx,
                width,
                height,
                wgpu::TextureFormat::Rgba8Unorm,
                Some("ray final"),
            ),
            depth: DepthStencilTexture::new(ctx, width, height, Some("ray depth")),
            width,
            height,
        }
    }

    /// Attachment dimensions.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The geometry pass color attachments, cleared.
    pub fn geometry_attachments(
        &self,
        clear: wgpu::LoadOp<wgpu::Color>,
    ) -> [Option<wgpu::RenderPassColorAttachment<'_>>; 5] {
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
        [
            attach(self.position.view()),
            attach(self.albedo.view()),
            attach(self.normal.view()),
            attach(self.material.view()),
            attach(self.specular.view()),
        ]
    }
}
