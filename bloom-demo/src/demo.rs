//! The blur demo delegate: owns every GPU resource and assembles the
//! per-frame pass graph.

use crate::passes::{BlurStagePass, CompositePass, ScenePass, TileTextures};
use crate::scene;
use bloom_gpu::{
    BlurStageDesc, BufferUsage, CameraUniforms, DEPTH_FORMAT, FrameGraph, Handle, PassBuilder,
    RenderPipelineBuilder, RenderTarget, Renderer, ResourceRegistry, SeparableBlur, TargetDesc,
    wgpu,
};
use bloom_window::{Camera, Projection, RenderDelegate};
use glam::Vec3;
use std::error::Error;
use std::sync::Arc;
use tracing::error;

/// Resolution of the offscreen scene target.
pub const SCENE_SIZE: u32 = 512;
/// Resolution of both blur targets. Smaller targets make a bigger blur.
pub const BLUR_SIZE: u32 = 128;
/// Multisample count for the scene target.
const SCENE_SAMPLES: u32 = 4;
/// Per-tap gain applied by the blur shader.
const ATTENUATION: f32 = 2.5;

/// Offscreen targets stay in linear color; tiles convert on the way to the
/// surface format.
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Edge length of one displayed tile.
pub const TILE_SIZE: u32 = 400;
/// Gap between neighbouring tiles.
pub const TILE_GUTTER: u32 = 2;
pub const TILE_COUNT: u32 = 4;

pub const WINDOW_WIDTH: u32 = TILE_COUNT * TILE_SIZE + (TILE_COUNT - 1) * TILE_GUTTER;
pub const WINDOW_HEIGHT: u32 = TILE_SIZE;

/// Left edge of a tile within the window.
pub fn tile_origin(index: u32) -> u32 {
    index * (TILE_SIZE + TILE_GUTTER)
}

/// output = destination + source: overlays the blur as a glow on the sharp
/// scene in the composite tile.
const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// The border stroke draws after the additive layer and must not blend.
const BORDER_BLEND: Option<wgpu::BlendState> = None;

/// Tile outline as a closed line strip, one pixel inside the tile edge.
fn border_outline() -> [[f32; 2]; 5] {
    let inset = 1.0 - 2.0 / TILE_SIZE as f32;
    [
        [-inset, -inset],
        [inset, -inset],
        [inset, inset],
        [-inset, inset],
        [-inset, -inset],
    ]
}

pub struct BlurDemo {
    camera: Camera,
    projection: Projection,
    camera_buffer: Handle<wgpu::Buffer>,
    camera_bind_group: Handle<wgpu::BindGroup>,

    scene_target: Handle<RenderTarget>,
    blur_target_1: Handle<RenderTarget>,
    blur_target_2: Handle<RenderTarget>,
    blur: SeparableBlur,

    scene_pipeline: Handle<wgpu::RenderPipeline>,
    vertex_buffer: Handle<wgpu::Buffer>,
    index_buffer: Handle<wgpu::Buffer>,
    instance_buffer: Handle<wgpu::Buffer>,
    index_count: u32,
    instance_count: u32,

    blit_pipeline: Handle<wgpu::RenderPipeline>,
    additive_pipeline: Handle<wgpu::RenderPipeline>,
    border_pipeline: Handle<wgpu::RenderPipeline>,
    border_vertices: Handle<wgpu::Buffer>,
    border_vertex_count: u32,

    scene_tile: Handle<wgpu::BindGroup>,
    horizontal_tile: Handle<wgpu::BindGroup>,
    full_blur_tile: Handle<wgpu::BindGroup>,
}

impl RenderDelegate for BlurDemo {
    fn create(
        renderer: &Renderer,
        registry: &mut ResourceRegistry,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, Box<dyn Error>> {
        let device = renderer.device();

        let camera = Camera::new(Vec3::new(0.0, 8.0, 25.0), Vec3::new(0.0, -1.0, 0.0));
        let projection = Projection::new(60f32.to_radians(), 1.0, 1000.0);

        // Offscreen targets: one multisampled scene target, two small blur
        // targets.
        let scene_target = RenderTarget::new(
            device,
            &TargetDesc {
                label: "scene target",
                width: SCENE_SIZE,
                height: SCENE_SIZE,
                format: TARGET_FORMAT,
                sample_count: SCENE_SAMPLES,
                depth: true,
            },
        );
        let blur_target_1 = RenderTarget::new(
            device,
            &TargetDesc {
                label: "blur target 1",
                width: BLUR_SIZE,
                height: BLUR_SIZE,
                format: TARGET_FORMAT,
                sample_count: 1,
                depth: false,
            },
        );
        let blur_target_2 = RenderTarget::new(
            device,
            &TargetDesc {
                label: "blur target 2",
                width: BLUR_SIZE,
                height: BLUR_SIZE,
                format: TARGET_FORMAT,
                sample_count: 1,
                depth: false,
            },
        );

        // Compiling the blur shader is the one failure handled here; it
        // propagates out and the shell quits before any draw call.
        let blur = SeparableBlur::new(
            renderer,
            registry,
            TARGET_FORMAT,
            BlurStageDesc {
                source: scene_target.sampled_view(),
                target_width: blur_target_1.width(),
                target_height: blur_target_1.height(),
            },
            BlurStageDesc {
                source: blur_target_1.sampled_view(),
                target_width: blur_target_2.width(),
                target_height: blur_target_2.height(),
            },
            ATTENUATION,
        )?;

        // Scene pipeline and geometry.
        let camera_buffer = renderer
            .create_buffer()
            .label("camera uniforms")
            .with_pod_data(&[CameraUniforms::from_matrices(
                glam::Mat4::IDENTITY,
                glam::Mat4::IDENTITY,
                camera.eye,
            )])
            .usage(BufferUsage::Uniform)
            .build(registry)?;

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera bind group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: registry
                    .get(camera_buffer)
                    .ok_or("camera buffer missing from registry")?
                    .as_entire_binding(),
            }],
        });

        let scene_shader =
            registry.insert(renderer.compile_shader("scene", bloom_gpu::shaders::SCENE)?);
        let scene_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("scene pipeline layout"),
                bind_group_layouts: &[&camera_layout],
                push_constant_ranges: &[],
            });
        let scene_pipeline = RenderPipelineBuilder::new(device)
            .with_label("scene pipeline")
            .with_shader(scene_shader)
            .with_layout(scene_pipeline_layout)
            .with_vertex_buffer(scene::vertex_layout())
            .with_vertex_buffer(scene::instance_layout())
            .with_multisample(wgpu::MultisampleState {
                count: SCENE_SAMPLES,
                mask: !0,
                alpha_to_coverage_enabled: false,
            })
            .with_depth_stencil(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            })
            .with_fragment_target(Some(wgpu::ColorTargetState {
                format: TARGET_FORMAT,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            }))
            .build(registry)?;

        let vertices = scene::cube_vertices(1.5);
        let indices = scene::cube_indices();
        let instance_data = scene::instances();

        let vertex_buffer = renderer
            .create_buffer()
            .label("cube vertices")
            .with_pod_data(&vertices)
            .usage(BufferUsage::Vertex)
            .build(registry)?;
        let index_buffer = renderer
            .create_buffer()
            .label("cube indices")
            .with_pod_data(&indices)
            .usage(BufferUsage::Index)
            .build(registry)?;
        let instance_buffer = renderer
            .create_buffer()
            .label("cube instances")
            .with_pod_data(&instance_data)
            .usage(BufferUsage::Vertex)
            .build(registry)?;

        // Tile pipelines against the window surface.
        let blit_shader =
            registry.insert(renderer.compile_shader("blit", bloom_gpu::shaders::BLIT)?);
        let tile_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tile sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let tile_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tile bind group layout"),
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
            ],
        });

        let tile_bind_group = |view: &wgpu::TextureView, label: &str| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &tile_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&tile_sampler),
                    },
                ],
            })
        };
        let scene_tile = tile_bind_group(scene_target.sampled_view(), "scene tile");
        let horizontal_tile = tile_bind_group(blur_target_1.sampled_view(), "horizontal tile");
        let full_blur_tile = tile_bind_group(blur_target_2.sampled_view(), "full blur tile");

        let blit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tile pipeline layout"),
            bind_group_layouts: &[&tile_layout],
            push_constant_ranges: &[],
        });
        let blit_pipeline = RenderPipelineBuilder::new(device)
            .with_label("tile pipeline")
            .with_shader(blit_shader)
            .with_layout(blit_layout)
            .with_fragment_target(Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            }))
            .build(registry)?;

        let additive_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("additive tile pipeline layout"),
            bind_group_layouts: &[&tile_layout],
            push_constant_ranges: &[],
        });
        let additive_pipeline = RenderPipelineBuilder::new(device)
            .with_label("additive tile pipeline")
            .with_shader(blit_shader)
            .with_layout(additive_layout)
            .with_fragment_target(Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(ADDITIVE_BLEND),
                write_mask: wgpu::ColorWrites::ALL,
            }))
            .build(registry)?;

        // Border stroke.
        let border_shader =
            registry.insert(renderer.compile_shader("border", bloom_gpu::shaders::BORDER)?);
        let outline = border_outline();
        let border_vertices = renderer
            .create_buffer()
            .label("border outline")
            .with_pod_data(&outline)
            .usage(BufferUsage::Vertex)
            .build(registry)?;
        let border_pipeline = RenderPipelineBuilder::new(device)
            .with_label("border pipeline")
            .with_shader(border_shader)
            .with_vertex_buffer(wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2],
            })
            .with_primitive(wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineStrip,
                ..Default::default()
            })
            .with_fragment_target(Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: BORDER_BLEND,
                write_mask: wgpu::ColorWrites::ALL,
            }))
            .build(registry)?;

        Ok(Self {
            camera,
            projection,
            camera_buffer,
            camera_bind_group: registry.insert(camera_bind_group),
            scene_target: registry.insert(scene_target),
            blur_target_1: registry.insert(blur_target_1),
            blur_target_2: registry.insert(blur_target_2),
            blur,
            scene_pipeline,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            index_count: indices.len() as u32,
            instance_count: instance_data.len() as u32,
            blit_pipeline,
            additive_pipeline,
            border_pipeline,
            border_vertices,
            border_vertex_count: outline.len() as u32,
            scene_tile: registry.insert(scene_tile),
            horizontal_tile: registry.insert(horizontal_tile),
            full_blur_tile: registry.insert(full_blur_tile),
        })
    }

    fn update(&mut self, queue: &wgpu::Queue, registry: &ResourceRegistry) {
        // The aspect ratio comes from the active target, recomputed before
        // every scene render rather than cached at startup.
        let Some(scene_target) = registry.get(self.scene_target) else {
            return;
        };
        let projection = self
            .projection
            .matrix(scene_target.width(), scene_target.height());
        let uniforms =
            CameraUniforms::from_matrices(self.camera.view_matrix(), projection, self.camera.eye);

        if let Some(buffer) = registry.get(self.camera_buffer) {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }
    }

    fn render(
        &mut self,
        renderer: &Renderer,
        registry: &ResourceRegistry,
        surface_view: Arc<wgpu::TextureView>,
    ) {
        let mut graph = FrameGraph::new();
        graph
            .add_pass(
                PassBuilder::new(Box::new(ScenePass::new(
                    self.scene_target,
                    self.scene_pipeline,
                    self.camera_bind_group,
                    self.vertex_buffer,
                    self.index_buffer,
                    self.instance_buffer,
                    self.index_count,
                    self.instance_count,
                )))
                .writes(self.scene_target),
            )
            .add_pass(
                PassBuilder::new(Box::new(BlurStagePass::new(
                    "horizontal blur pass",
                    self.blur.pipeline(),
                    self.blur.horizontal_bind_group(),
                    self.blur_target_1,
                )))
                .reads(self.scene_target)
                .writes(self.blur_target_1),
            )
            .add_pass(
                PassBuilder::new(Box::new(BlurStagePass::new(
                    "vertical blur pass",
                    self.blur.pipeline(),
                    self.blur.vertical_bind_group(),
                    self.blur_target_2,
                )))
                .reads(self.blur_target_1)
                .writes(self.blur_target_2),
            )
            .add_pass(
                PassBuilder::new(Box::new(CompositePass::new(
                    surface_view,
                    self.blit_pipeline,
                    self.additive_pipeline,
                    self.border_pipeline,
                    self.border_vertices,
                    self.border_vertex_count,
                    TileTextures {
                        scene: self.scene_tile,
                        horizontal_blur: self.horizontal_tile,
                        full_blur: self.full_blur_tile,
                    },
                )))
                .reads(self.scene_target)
                .reads(self.blur_target_2),
            );

        match graph.build() {
            Ok(executable) => executable.execute(renderer.device(), renderer.queue(), registry),
            Err(e) => error!("frame graph build failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_exactly_four_tiles_and_gutters() {
        assert_eq!(WINDOW_WIDTH, 1606);
        assert_eq!(WINDOW_HEIGHT, 400);
    }

    #[test]
    fn tiles_are_contiguous_and_non_overlapping() {
        assert_eq!(
            (0..TILE_COUNT).map(tile_origin).collect::<Vec<_>>(),
            [0, 402, 804, 1206]
        );

        for index in 0..TILE_COUNT - 1 {
            let right_edge = tile_origin(index) + TILE_SIZE;
            assert_eq!(tile_origin(index + 1) - right_edge, TILE_GUTTER);
        }
        assert_eq!(tile_origin(TILE_COUNT - 1) + TILE_SIZE, WINDOW_WIDTH);
    }

    #[test]
    fn composite_blend_is_additive_and_border_is_opaque() {
        assert_eq!(ADDITIVE_BLEND.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(ADDITIVE_BLEND.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(ADDITIVE_BLEND.color.operation, wgpu::BlendOperation::Add);
        assert!(BORDER_BLEND.is_none());
    }

    #[test]
    fn border_outline_is_a_closed_loop_inside_the_tile() {
        let outline = border_outline();
        assert_eq!(outline.first(), outline.last());
        assert!(
            outline
                .iter()
                .flatten()
                .all(|coordinate| coordinate.abs() < 1.0)
        );
    }
}
