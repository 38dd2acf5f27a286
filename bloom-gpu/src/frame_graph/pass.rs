use crate::registry::{Handle, ResourceRegistry};
use std::any::Any;
use std::collections::HashSet;

/// Execution context handed to each pass while recording.
pub struct PassContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub resources: &'a ResourceRegistry,
}

impl<'a> PassContext<'a> {
    pub fn create_command_encoder(&self, label: Option<&str>) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label })
    }

    pub fn get<T: Any>(&self, handle: Handle<T>) -> Option<&T> {
        self.resources.get(handle)
    }
}

/// A unit of GPU work. Passes record into their own encoder and hand the
/// finished command buffer back to the graph for batched submission.
pub trait Pass: Send + Sync {
    fn name(&self) -> &str;
    fn execute(&self, ctx: &PassContext) -> wgpu::CommandBuffer;
}

/// Declares a pass together with the resources it touches.
pub struct PassBuilder {
    reads: HashSet<u64>,
    writes: HashSet<u64>,
    pass: Box<dyn Pass>,
}

impl PassBuilder {
    pub fn new(pass: Box<dyn Pass>) -> Self {
        Self {
            reads: HashSet::new(),
            writes: HashSet::new(),
            pass,
        }
    }

    pub fn reads<T>(mut self, handle: Handle<T>) -> Self {
        self.reads.insert(handle.id());
        self
    }

    pub fn writes<T>(mut self, handle: Handle<T>) -> Self {
        self.writes.insert(handle.id());
        self
    }

    pub(crate) fn build(self) -> PassNode {
        PassNode {
            reads: self.reads,
            writes: self.writes,
            pass: self.pass,
        }
    }
}

/// A pass plus its resolved read/write sets.
pub struct PassNode {
    reads: HashSet<u64>,
    writes: HashSet<u64>,
    pass: Box<dyn Pass>,
}

impl PassNode {
    pub fn name(&self) -> &str {
        self.pass.name()
    }

    pub fn reads(&self) -> &HashSet<u64> {
        &self.reads
    }

    pub fn writes(&self) -> &HashSet<u64> {
        &self.writes
    }

    pub fn pass(&self) -> &dyn Pass {
        self.pass.as_ref()
    }
}
