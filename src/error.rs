//! Engine error types.
//!
//! Initialisation failures are fatal: callers receive them as `Err` and are
//! expected to abort. Runtime failures during a frame are logged at the call
//! site and the frame continues where possible.

use thiserror::Error;

/// Errors produced by engine initialisation and GPU resource creation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No suitable GPU adapter was found on this system.
    #[error("no suitable GPU adapter found")]
    AdapterNotFound,

    /// The adapter refused to provide a device with the required features.
    #[error("failed to acquire GPU device: {0}")]
    DeviceRequest(String),

    /// A kernel (compute shader) failed to build. Carries the shader label
    /// and the device's build log.
    #[error("kernel program `{name}` failed to build: {log}")]
    KernelBuild { name: &'static str, log: String },

    /// A raster shader or pipeline failed validation.
    #[error("shader program `{name}` failed to link: {log}")]
    ShaderLink { name: &'static str, log: String },

    /// Framebuffer aggregate creation failed.
    #[error("framebuffer initialisation failed: {0}")]
    FramebufferInit(String),
}
