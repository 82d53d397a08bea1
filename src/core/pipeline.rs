//! Render and compute pipeline builders
//!
//! Builder patterns for wgpu pipelines. Shader build failures are caught
//! through a validation error scope and surfaced as typed errors carrying
//! the device's build log, so the embedding program can log and abort.

use crate::context::WgpuContext;
use crate::core::render_states::{BlendState, CullState, DepthState};
use crate::core::texture::DepthStencilTexture;
use crate::error::EngineError;

/// Builder for creating render pipelines, with one color target per
/// configured format so multi-render-target passes fall out naturally.
pub struct PipelineBuilder<'a> {
    ctx: &'a WgpuContext,
    label: &'static str,
    shader_source: Option<&'a str>,
    vertex_entry: &'a str,
    fragment_entry: &'a str,
    vertex_layouts: Vec<wgpu::VertexBufferLayout<'a>>,
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
    color_formats: Vec<wgpu::TextureFormat>,
    depth_state: Option<DepthState>,
    blend_state: BlendState,
    cull_state: CullState,
}

impl<'a> PipelineBuilder<'a> {
    /// Create a new pipeline builder.
    pub fn new(ctx: &'a WgpuContext, label: &'static str) -> Self {
        Self {
            ctx,
            label,
            shader_source: None,
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            vertex_layouts: Vec::new(),
            bind_group_layouts: Vec::new(),
            color_formats: Vec::new(),
            depth_state: None,
            blend_state: BlendState::Opaque,
            cull_state: CullState::Back,
        }
    }

    /// Set the shader source (WGSL).
    pub fn shader(mut self, source: &'a str) -> Self {
        self.shader_source = Some(source);
        self
    }

    /// Add a vertex buffer layout.
    pub fn vertex_layout(mut self, layout: wgpu::VertexBufferLayout<'a>) -> Self {
        self.vertex_layouts.push(layout);
        self
    }

    /// Add a bind group layout.
    pub fn bind_group_layout(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    /// Add a color target format. Call once per render target.
    pub fn color_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.color_formats.push(format);
        self
    }

    /// Enable depth-stencil testing.
    pub fn depth(mut self, state: DepthState) -> Self {
        self.depth_state = Some(state);
        self
    }

    /// Set the blend state (applied to every color target).
    pub fn blend(mut self, state: BlendState) -> Self {
        self.blend_state = state;
        self
    }

    /// Set the cull state.
    pub fn cull(mut self, state: CullState) -> Self {
        self.cull_state = state;
        self
    }

    /// Build the render pipeline.
    pub fn build(self) -> Result<wgpu::RenderPipeline, EngineError> {
        let shader_source = self.shader_source.ok_or_else(|| EngineError::ShaderLink {
            name: self.label,
            log: "no shader source provided".into(),
        })?;

        let error_scope = self.ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader_module = self
            .ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(self.label),
                source: wgpu::ShaderSource::Wgsl(shader_source.into()),
            });

        let pipeline_layout =
            self.ctx
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(self.label),
                    bind_group_layouts: &self.bind_group_layouts,
                    immediate_size: 0,
                });

        let targets: Vec<Option<wgpu::ColorTargetState>> = self
            .color_formats
            .iter()
            .map(|format| {
                Some(wgpu::ColorTargetState {
                    format: *format,
                    blend: self.blend_state.to_wgpu(),
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect();

        let pipeline = self
            .ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(self.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader_module,
                    entry_point: Some(self.vertex_entry),
                    buffers: &self.vertex_layouts,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader_module,
                    entry_point: Some(self.fragment_entry),
                    targets: &targets,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: self.cull_state.to_wgpu(),
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: self
                    .depth_state
                    .map(|state| state.to_wgpu(DepthStencilTexture::FORMAT)),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview_mask: None,
                cache: None,
            });

        if let Some(error) = pollster::block_on(error_scope.pop()) {
            return Err(EngineError::ShaderLink {
                name: self.label,
                log: error.to_string(),
            });
        }
        Ok(pipeline)
    }
}

/// Builder for compute pipelines (kernel programs).
pub struct ComputePipelineBuilder<'a> {
    ctx: &'a WgpuContext,
    label: &'static str,
    shader_source: Option<&'a str>,
    entry: &'a str,
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
}

impl<'a> ComputePipelineBuilder<'a> {
    /// Create a new compute pipeline builder.
    pub fn new(ctx: &'a WgpuContext, label: &'static str) -> Self {
        Self {
            ctx,
            label,
            shader_source: None,
            entry: "main",
            bind_group_layouts: Vec::new(),
        }
    }

    /// Set the kernel source (WGSL).
    pub fn shader(mut self, source: &'a str) -> Self {
        self.shader_source = Some(source);
        self
    }

    /// Set the kernel entry point.
    pub fn entry(mut self, entry: &'a str) -> Self {
        self.entry = entry;
        self
    }

    /// Add a bind group layout.
    pub fn bind_group_layout(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    /// Build the compute pipeline, surfacing the device build log on
    /// failure.
    pub fn build(self) -> Result<wgpu::ComputePipeline, EngineError> {
        let shader_source = self.shader_source.ok_or_else(|| EngineError::KernelBuild {
            name: self.label,
            log: "no kernel source provided".into(),
        })?;

        let error_scope = self.ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader_module = self
            .ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(self.label),
                source: wgpu::ShaderSource::Wgsl(shader_source.into()),
            });

        let pipeline_layout =
            self.ctx
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(self.label),
                    bind_group_layouts: &self.bind_group_layouts,
                    immediate_size: 0,
                });

        let pipeline = self
            .ctx
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(self.label),
                layout: Some(&pipeline_layout),
                module: &shader_module,
                entry_point: Some(self.entry),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });

        if let Some(error) = pollster::block_on(error_scope.pop()) {
            return Err(EngineError::KernelBuild {
                name: self.label,
                log: error.to_string(),
            });
        }
        Ok(pipeline)
    }
}
