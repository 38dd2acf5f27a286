//! Ergonomic buffer creation on top of wgpu descriptors.

use crate::registry::{Handle, ResourceRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
    /// Uniform buffers are created copy-dst so they can be rewritten per
    /// frame with `Queue::write_buffer`.
    Uniform,
}

impl BufferUsage {
    fn to_wgpu(self) -> wgpu::BufferUsages {
        match self {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
            BufferUsage::Uniform => wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        }
    }
}

pub struct BufferBuilder<'a> {
    device: &'a wgpu::Device,
    label: Option<String>,
    data: Option<&'a [u8]>,
    usage: BufferUsage,
}

impl<'a> BufferBuilder<'a> {
    pub(crate) fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            label: None,
            data: None,
            usage: BufferUsage::Vertex,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Initialize the buffer from a slice of pod values.
    pub fn with_pod_data<T: bytemuck::Pod>(mut self, data: &'a [T]) -> Self {
        self.data = Some(bytemuck::cast_slice(data));
        self
    }

    pub fn usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Build the buffer and register it.
    pub fn build(
        self,
        registry: &mut ResourceRegistry,
    ) -> Result<Handle<wgpu::Buffer>, BufferBuildError> {
        use wgpu::util::DeviceExt;

        let data = self.data.ok_or(BufferBuildError::MissingData)?;
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: self.label.as_deref(),
                contents: data,
                usage: self.usage.to_wgpu(),
            });

        Ok(registry.insert(buffer))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BufferBuildError {
    #[error("buffer has no initial data")]
    MissingData,
}
