//! Hybrid render pipeline: rasterised G-buffer, compute ray-trace passes,
//! tone reproduction, and the final blit.
//!
//! One frame is a fixed sequence:
//!
//! 1. Upload the frame's scene description (collider caches, lights, camera)
//! 2. Geometry pass into the RayBuffer and GlobalBuffer material targets
//! 3. Acquire the aggregates for kernel use
//! 4. Ray-trace kernel (shadows + local illumination)
//! 5. Reflection kernels (per-class traces, min-distance merge)
//! 6. Transmission kernel (sphere-only)
//! 7. Tone reproduction (log-luminance reduction, Reinhard map)
//! 8. Release the aggregates and blit the final texture to the target
//! 9. Wait for the queue so the image is complete before the swap
//!
//! The rasteriser and the kernels share one in-order queue, so the
//! acquire/release bracket is an ownership assertion rather than a
//! cross-API event: every submission before the bracket is ordered ahead of
//! every kernel dispatch inside it.

pub mod blit;
pub mod camera;
pub mod geometry;
pub mod global_buffer;
pub mod kernel;
pub mod light;
pub mod ray_buffer;
pub mod raytrace;
pub mod reflection;
pub mod tone;
pub mod transmission;

pub use camera::Camera;
pub use geometry::DrawItem;
pub use global_buffer::GlobalBuffer;
pub use kernel::{KernelParams, KernelProgram, SceneBuffers, SceneDescription};
pub use light::{Attenuation, DirectionalLight, PointLight};
pub use ray_buffer::RayBuffer;

use crate::assets::AssetStore;
use crate::context::WgpuContext;
use crate::error::EngineError;

/// Which side currently owns the shared framebuffer textures.
///
/// A kernel must never read a texture still owned by the rasteriser;
/// the bracket makes that a checked state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextureOwner {
    Raster,
    Kernels,
}

/// Everything the pipeline needs to draw one frame.
pub struct FrameInput<'a> {
    pub camera: &'a Camera,
    pub scene: &'a SceneDescription,
    pub draws: &'a [DrawItem],
    pub assets: &'a AssetStore,
}

/// The hybrid raster + ray-trace pipeline.
pub struct RayTracerPipeline {
    width: u32,
    height: u32,
    ray_buffer: RayBuffer,
    global_buffer: GlobalBuffer,
    scene_buffers: SceneBuffers,
    geometry: geometry::GeometryPass,
    raytrace: raytrace::RayTraceKernel,
    reflection: reflection::ReflectionKernel,
    transmission: transmission::TransmissionKernel,
    tone: tone::ToneKernel,
    blit: blit::BlitPass,
    owner: TextureOwner,
}

impl RayTracerPipeline {
    /// Build the pipeline and all kernel programs for the given output
    /// dimensions and target format. A kernel build failure is fatal.
    pub fn new(
        ctx: &WgpuContext,
        width: u32,
        height: u32,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::FramebufferInit(format!(
                "degenerate dimensions {width}x{height}"
            )));
        }

        let ray_buffer = RayBuffer::new(ctx, width, height);
        let global_buffer = GlobalBuffer::new(ctx, width, height);
        let scene_buffers = SceneBuffers::new(ctx);

        let geometry = geometry::GeometryPass::new(ctx)?;
        let raytrace =
            raytrace::RayTraceKernel::new(ctx, &ray_buffer, &global_buffer, &scene_buffers)?;
        let reflection =
            reflection::ReflectionKernel::new(ctx, &ray_buffer, &global_buffer, &scene_buffers)?;
        let transmission =
            transmission::TransmissionKernel::new(ctx, &ray_buffer, &global_buffer, &scene_buffers)?;
        let tone = tone::ToneKernel::new(ctx, &global_buffer, width, height)?;
        let blit = blit::BlitPass::new(ctx, &global_buffer.final_image, target_format)?;

        tracing::info!(target: "lucent::render", width, height, "render pipeline initialized");

        Ok(Self {
            width,
            height,
            ray_buffer,
            global_buffer,
            scene_buffers,
            geometry,
            raytrace,
            reflection,
            transmission,
            tone,
            blit,
            owner: TextureOwner::Raster,
        })
    }

    /// Recreate every size-dependent resource at new dimensions.
    pub fn resize(
        &mut self,
        ctx: &WgpuContext,
        width: u32,
        height: u32,
        target_format: wgpu::TextureFormat,
    ) -> Result<(), EngineError> {
        *self = Self::new(ctx, width, height, target_format)?;
        Ok(())
    }

    /// Output dimensions.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Hand the shared textures to the kernels. All outstanding raster work
    /// is already submitted; the in-order queue stands in for the interop
    /// event.
    fn acquire_for_kernels(&mut self) {
        debug_assert_eq!(self.owner, TextureOwner::Raster, "double acquire");
        self.owner = TextureOwner::Kernels;
    }

    /// Return the shared textures to the rasteriser.
    fn release_from_kernels(&mut self) {
        debug_assert_eq!(self.owner, TextureOwner::Kernels, "release without acquire");
        self.owner = TextureOwner::Raster;
    }

    /// Render one frame into `target`.
    pub fn render(&mut self, ctx: &WgpuContext, frame: &FrameInput, target: &wgpu::TextureView) {
        // Scene description for the kernels.
        self.scene_buffers.upload(ctx, frame.scene);

        // Geometry pass.
        let mut encoder = ctx.create_encoder(Some("geometry"));
        self.geometry.encode(
            ctx,
            &mut encoder,
            &self.ray_buffer,
            &self.global_buffer,
            frame.camera,
            frame.assets,
            frame.draws,
        );
        ctx.submit([encoder.finish()]);

        // Kernel passes inside the ownership bracket.
        self.acquire_for_kernels();
        let params = KernelParams {
            width: self.width,
            height: self.height,
        };
        for kernel in [
            &self.raytrace as &dyn KernelProgram,
            &self.reflection,
            &self.transmission,
            &self.tone,
        ] {
            kernel.execute(ctx, &self.scene_buffers, &params);
        }
        self.release_from_kernels();

        // Blit the final texture to the target.
        let mut encoder = ctx.create_encoder(Some("blit"));
        self.blit.encode(&mut encoder, target);
        ctx.submit([encoder.finish()]);

        // Frame-end finish: the blitted image is complete before the swap.
        ctx.finish();
    }
}
