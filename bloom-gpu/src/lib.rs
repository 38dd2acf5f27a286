//! GPU plumbing for the blur demo: device bring-up, surface management,
//! typed resource registry, buffer/pipeline builders, offscreen render
//! targets, and the two-pass separable blur filter.

pub mod blur;
pub mod builder;
pub mod frame_graph;
pub mod pipeline;
pub mod registry;
pub mod shaders;
pub mod surface;
pub mod targets;
pub mod types;

pub use blur::{BlurStageDesc, BlurUniforms, SeparableBlur, horizontal_offset, vertical_offset};
pub use builder::{BufferBuildError, BufferBuilder, BufferUsage};
pub use frame_graph::{
    ExecutableFrameGraph, FrameGraph, FrameGraphError, Pass, PassBuilder, PassContext,
};
pub use pipeline::{PipelineBuildError, RenderPipelineBuilder};
pub use registry::{Handle, ResourceRegistry};
pub use surface::SurfaceWrapper;
pub use targets::{DEPTH_FORMAT, RenderTarget, TargetDesc};
pub use types::CameraUniforms;

pub use wgpu;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("request adapter error: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    #[error("request device error: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("create surface error: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("surface is not supported by the active adapter")]
    UnsupportedSurface,
    #[error("shader '{label}' failed to compile: {message}")]
    ShaderCompile { label: String, message: String },
    #[error(transparent)]
    PipelineBuild(#[from] PipelineBuildError),
    #[error(transparent)]
    BufferBuild(#[from] BufferBuildError),
}

/// Owns the wgpu instance, adapter and the device/queue pair.
pub struct Renderer {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Renderer {
    pub async fn new() -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await?;

        let info = adapter.get_info();
        tracing::info!("using adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("bloom device"),
                ..Default::default()
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Configure `surface` for presentation and wrap it with its config.
    pub fn create_surface(
        &self,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<SurfaceWrapper, RendererError> {
        let caps = surface.get_capabilities(&self.adapter);
        let format = caps
            .formats
            .first()
            .copied()
            .ok_or(RendererError::UnsupportedSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&self.device, &config);

        Ok(SurfaceWrapper::new(surface, config))
    }

    pub fn create_buffer(&self) -> BufferBuilder<'_> {
        BufferBuilder::new(&self.device)
    }

    /// Compile a WGSL module inside a validation error scope.
    ///
    /// A malformed shader is the one startup failure this crate surfaces to
    /// callers; everything downstream assumes modules in the registry are
    /// valid.
    pub fn compile_shader(
        &self,
        label: &str,
        source: &str,
    ) -> Result<wgpu::ShaderModule, RendererError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RendererError::ShaderCompile {
                label: label.to_string(),
                message: error.to_string(),
            });
        }
        Ok(module)
    }
}
