//! Offscreen color targets, optionally multisampled.

use std::sync::Arc;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Description of an offscreen render target.
pub struct TargetDesc<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    /// 1 for a plain target; higher counts allocate an extra single-sample
    /// resolve texture, which is what later passes sample.
    pub sample_count: u32,
    pub depth: bool,
}

/// A GPU texture the scene is drawn into instead of the window, later read
/// back as a texture by downstream passes.
pub struct RenderTarget {
    color_view: Arc<wgpu::TextureView>,
    resolve_view: Option<Arc<wgpu::TextureView>>,
    depth_view: Option<Arc<wgpu::TextureView>>,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    sample_count: u32,
}

impl RenderTarget {
    pub fn new(device: &wgpu::Device, desc: &TargetDesc) -> Self {
        let multisampled = desc.sample_count > 1;

        // The multisampled attachment itself cannot be sampled; only give it
        // a binding usage when it doubles as the sampled texture.
        let mut color_usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        if !multisampled {
            color_usage |= wgpu::TextureUsages::TEXTURE_BINDING;
        }

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: desc.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage: color_usage,
            view_formats: &[],
        });
        let color_view = Arc::new(color.create_view(&wgpu::TextureViewDescriptor::default()));

        let resolve_view = multisampled.then(|| {
            let resolve = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(desc.label),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: desc.format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            Arc::new(resolve.create_view(&wgpu::TextureViewDescriptor::default()))
        });

        let depth_view = desc.depth.then(|| {
            let depth = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(desc.label),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: desc.sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            Arc::new(depth.create_view(&wgpu::TextureViewDescriptor::default()))
        });

        Self {
            color_view,
            resolve_view,
            depth_view,
            width: desc.width,
            height: desc.height,
            format: desc.format,
            sample_count: desc.sample_count,
        }
    }

    /// Color attachment for rendering into this target, resolving into the
    /// single-sample texture when multisampled.
    pub fn color_attachment(&self, clear: wgpu::Color) -> wgpu::RenderPassColorAttachment<'_> {
        wgpu::RenderPassColorAttachment {
            view: &self.color_view,
            depth_slice: None,
            resolve_target: self.resolve_view.as_deref(),
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
        }
    }

    pub fn depth_attachment(&self) -> Option<wgpu::RenderPassDepthStencilAttachment<'_>> {
        self.depth_view
            .as_deref()
            .map(|view| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            })
    }

    /// The view downstream passes may bind as a texture. Never the
    /// multisampled attachment itself.
    pub fn sampled_view(&self) -> &Arc<wgpu::TextureView> {
        self.resolve_view.as_ref().unwrap_or(&self.color_view)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }
}
