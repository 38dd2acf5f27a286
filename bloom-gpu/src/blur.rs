//! Two-pass separable Gaussian blur.
//!
//! A 2-D Gaussian factors into two 1-D convolutions, so the filter runs the
//! same single-axis shader twice: horizontally into an intermediate target,
//! then vertically over that intermediate. Offsets are expressed in
//! normalized texture coordinates (1/resolution) so the fixed-tap kernel
//! scales with the destination target, whatever its pixel size.

use crate::pipeline::RenderPipelineBuilder;
use crate::registry::{Handle, ResourceRegistry};
use crate::{Renderer, RendererError, shaders};
use glam::Vec2;

/// Uniform block consumed by [`shaders::BLUR`].
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlurUniforms {
    /// Per-tap step in normalized texture coordinates. Exactly one axis is
    /// non-zero per stage.
    pub sample_offset: [f32; 2],
    /// Scale applied to the weighted sum; doubles as a brightness knob for
    /// the additive composite.
    pub attenuation: f32,
    pub _padding: f32,
}

/// Texel offset for the horizontal stage: one texel along x, nothing on y.
pub fn horizontal_offset(target_width: u32) -> Vec2 {
    Vec2::new(1.0 / target_width as f32, 0.0)
}

/// Texel offset for the vertical stage: one texel along y, nothing on x.
pub fn vertical_offset(target_height: u32) -> Vec2 {
    Vec2::new(0.0, 1.0 / target_height as f32)
}

/// Source texture and destination dimensions for one blur stage.
pub struct BlurStageDesc<'a> {
    pub source: &'a wgpu::TextureView,
    pub target_width: u32,
    pub target_height: u32,
}

struct BlurStage {
    uniforms: Handle<wgpu::Buffer>,
    bind_group: Handle<wgpu::BindGroup>,
}

/// The compiled blur pipeline plus per-stage uniforms and bind groups.
pub struct SeparableBlur {
    pipeline: Handle<wgpu::RenderPipeline>,
    horizontal: BlurStage,
    vertical: BlurStage,
}

impl SeparableBlur {
    pub fn new(
        renderer: &Renderer,
        registry: &mut ResourceRegistry,
        target_format: wgpu::TextureFormat,
        horizontal: BlurStageDesc,
        vertical: BlurStageDesc,
        attenuation: f32,
    ) -> Result<Self, RendererError> {
        let device = renderer.device();

        let shader = renderer.compile_shader("blur", shaders::BLUR)?;
        let shader = registry.insert(shader);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blur sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blur bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blur pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = RenderPipelineBuilder::new(device)
            .with_label("blur pipeline")
            .with_shader(shader)
            .with_layout(pipeline_layout)
            .with_fragment_target(Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            }))
            .build(registry)?;

        let horizontal = Self::create_stage(
            renderer,
            registry,
            &bind_group_layout,
            &sampler,
            "blur horizontal",
            horizontal.source,
            horizontal_offset(horizontal.target_width),
            attenuation,
        );
        let vertical = Self::create_stage(
            renderer,
            registry,
            &bind_group_layout,
            &sampler,
            "blur vertical",
            vertical.source,
            vertical_offset(vertical.target_height),
            attenuation,
        );

        Ok(Self {
            pipeline,
            horizontal,
            vertical,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn create_stage(
        renderer: &Renderer,
        registry: &mut ResourceRegistry,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        label: &str,
        source: &wgpu::TextureView,
        sample_offset: Vec2,
        attenuation: f32,
    ) -> BlurStage {
        use wgpu::util::DeviceExt;

        let device = renderer.device();
        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[BlurUniforms {
                sample_offset: sample_offset.to_array(),
                attenuation,
                _padding: 0.0,
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
            ],
        });

        BlurStage {
            uniforms: registry.insert(uniforms),
            bind_group: registry.insert(bind_group),
        }
    }

    pub fn pipeline(&self) -> Handle<wgpu::RenderPipeline> {
        self.pipeline
    }

    pub fn horizontal_bind_group(&self) -> Handle<wgpu::BindGroup> {
        self.horizontal.bind_group
    }

    pub fn vertical_bind_group(&self) -> Handle<wgpu::BindGroup> {
        self.vertical.bind_group
    }

    pub fn horizontal_uniforms(&self) -> Handle<wgpu::Buffer> {
        self.horizontal.uniforms
    }

    pub fn vertical_uniforms(&self) -> Handle<wgpu::Buffer> {
        self.vertical.uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_uniforms_match_wgsl_layout() {
        // vec2 + f32 + pad, 16 bytes for the uniform block.
        assert_eq!(std::mem::size_of::<BlurUniforms>(), 16);
    }

    #[test]
    fn each_stage_steps_along_exactly_one_axis() {
        let horizontal = horizontal_offset(128);
        let vertical = vertical_offset(128);

        assert_eq!(horizontal, Vec2::new(1.0 / 128.0, 0.0));
        assert_eq!(vertical, Vec2::new(0.0, 1.0 / 128.0));

        // The stages never share a non-zero axis.
        assert_eq!(horizontal.y, 0.0);
        assert_eq!(vertical.x, 0.0);
        assert_eq!(horizontal * vertical, Vec2::ZERO);
    }

    #[test]
    fn offsets_scale_with_target_resolution() {
        assert_eq!(horizontal_offset(512).x, 1.0 / 512.0);
        assert_eq!(vertical_offset(256).y, 1.0 / 256.0);
    }
}
