//! Frame graph passes for the blur demo.

use crate::demo::{TILE_COUNT, TILE_SIZE, tile_origin};
use bloom_gpu::{Handle, Pass, PassContext, RenderTarget, wgpu};
use std::sync::Arc;

/// Renders the instanced cube scene into the multisampled scene target.
pub struct ScenePass {
    target: Handle<RenderTarget>,
    pipeline: Handle<wgpu::RenderPipeline>,
    camera_bind_group: Handle<wgpu::BindGroup>,
    vertex_buffer: Handle<wgpu::Buffer>,
    index_buffer: Handle<wgpu::Buffer>,
    instance_buffer: Handle<wgpu::Buffer>,
    index_count: u32,
    instance_count: u32,
}

impl ScenePass {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        target: Handle<RenderTarget>,
        pipeline: Handle<wgpu::RenderPipeline>,
        camera_bind_group: Handle<wgpu::BindGroup>,
        vertex_buffer: Handle<wgpu::Buffer>,
        index_buffer: Handle<wgpu::Buffer>,
        instance_buffer: Handle<wgpu::Buffer>,
        index_count: u32,
        instance_count: u32,
    ) -> Self {
        Self {
            target,
            pipeline,
            camera_bind_group,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            index_count,
            instance_count,
        }
    }
}

impl Pass for ScenePass {
    fn name(&self) -> &str {
        "scene"
    }

    fn execute(&self, ctx: &PassContext) -> wgpu::CommandBuffer {
        let mut encoder = ctx.create_command_encoder(Some("scene encoder"));

        let target = ctx.get(self.target).expect("scene target");
        let pipeline = ctx.get(self.pipeline).expect("scene pipeline");
        let camera_bind_group = ctx.get(self.camera_bind_group).expect("camera bind group");
        let vertex_buffer = ctx.get(self.vertex_buffer).expect("vertex buffer");
        let index_buffer = ctx.get(self.index_buffer).expect("index buffer");
        let instance_buffer = ctx.get(self.instance_buffer).expect("instance buffer");

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene pass"),
            color_attachments: &[Some(target.color_attachment(wgpu::Color::BLACK))],
            depth_stencil_attachment: target.depth_attachment(),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, instance_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);

        drop(render_pass);
        encoder.finish()
    }
}

/// One axis of the separable blur: samples a source texture through the
/// blur pipeline into a destination target with a fullscreen triangle.
pub struct BlurStagePass {
    label: &'static str,
    pipeline: Handle<wgpu::RenderPipeline>,
    bind_group: Handle<wgpu::BindGroup>,
    destination: Handle<RenderTarget>,
}

impl BlurStagePass {
    pub fn new(
        label: &'static str,
        pipeline: Handle<wgpu::RenderPipeline>,
        bind_group: Handle<wgpu::BindGroup>,
        destination: Handle<RenderTarget>,
    ) -> Self {
        Self {
            label,
            pipeline,
            bind_group,
            destination,
        }
    }
}

impl Pass for BlurStagePass {
    fn name(&self) -> &str {
        self.label
    }

    fn execute(&self, ctx: &PassContext) -> wgpu::CommandBuffer {
        let mut encoder = ctx.create_command_encoder(Some(self.label));

        let destination = ctx.get(self.destination).expect("blur target");
        let pipeline = ctx.get(self.pipeline).expect("blur pipeline");
        let bind_group = ctx.get(self.bind_group).expect("blur bind group");

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.label),
            color_attachments: &[Some(destination.color_attachment(wgpu::Color::BLACK))],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.draw(0..3, 0..1);

        drop(render_pass);
        encoder.finish()
    }
}

/// Bind groups for the textures the window tiles display.
pub struct TileTextures {
    pub scene: Handle<wgpu::BindGroup>,
    pub horizontal_blur: Handle<wgpu::BindGroup>,
    pub full_blur: Handle<wgpu::BindGroup>,
}

/// Draws the four window tiles by restricting the viewport per tile: raw
/// scene, horizontal-only blur, full blur, and the additive composite.
/// Each tile is finished with a stroked border.
pub struct CompositePass {
    surface_view: Arc<wgpu::TextureView>,
    blit_pipeline: Handle<wgpu::RenderPipeline>,
    additive_pipeline: Handle<wgpu::RenderPipeline>,
    border_pipeline: Handle<wgpu::RenderPipeline>,
    border_vertices: Handle<wgpu::Buffer>,
    border_vertex_count: u32,
    tiles: TileTextures,
}

impl CompositePass {
    pub fn new(
        surface_view: Arc<wgpu::TextureView>,
        blit_pipeline: Handle<wgpu::RenderPipeline>,
        additive_pipeline: Handle<wgpu::RenderPipeline>,
        border_pipeline: Handle<wgpu::RenderPipeline>,
        border_vertices: Handle<wgpu::Buffer>,
        border_vertex_count: u32,
        tiles: TileTextures,
    ) -> Self {
        Self {
            surface_view,
            blit_pipeline,
            additive_pipeline,
            border_pipeline,
            border_vertices,
            border_vertex_count,
            tiles,
        }
    }
}

impl Pass for CompositePass {
    fn name(&self) -> &str {
        "composite"
    }

    fn execute(&self, ctx: &PassContext) -> wgpu::CommandBuffer {
        let mut encoder = ctx.create_command_encoder(Some("composite encoder"));

        let blit = ctx.get(self.blit_pipeline).expect("blit pipeline");
        let additive = ctx.get(self.additive_pipeline).expect("additive pipeline");
        let border = ctx.get(self.border_pipeline).expect("border pipeline");
        let border_vertices = ctx.get(self.border_vertices).expect("border vertices");
        let scene = ctx.get(self.tiles.scene).expect("scene tile texture");
        let horizontal = ctx
            .get(self.tiles.horizontal_blur)
            .expect("horizontal tile texture");
        let full = ctx.get(self.tiles.full_blur).expect("full blur tile texture");

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("composite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.surface_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        // Fixed tile order: raw scene, horizontal-only, full blur, then the
        // scene again with the full blur added on top.
        let single_layers = [[(blit, scene)], [(blit, horizontal)], [(blit, full)]];
        let composite_layers = [(blit, scene), (additive, full)];
        let layers: [&[(&wgpu::RenderPipeline, &wgpu::BindGroup)]; TILE_COUNT as usize] = [
            &single_layers[0],
            &single_layers[1],
            &single_layers[2],
            &composite_layers,
        ];

        for (index, tile_layers) in layers.iter().enumerate() {
            render_pass.set_viewport(
                tile_origin(index as u32) as f32,
                0.0,
                TILE_SIZE as f32,
                TILE_SIZE as f32,
                0.0,
                1.0,
            );

            for &(pipeline, bind_group) in tile_layers.iter() {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }

            // The border pipeline carries no blend state, so the additive
            // mode above cannot bleed into the stroke.
            render_pass.set_pipeline(border);
            render_pass.set_vertex_buffer(0, border_vertices.slice(..));
            render_pass.draw(0..self.border_vertex_count, 0..1);
        }

        drop(render_pass);
        encoder.finish()
    }
}
