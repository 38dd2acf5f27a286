//! Minimal frame graph: passes declare which resources they read and
//! write, and execution order falls out of those hazards instead of
//! declaration order.

mod execution;
mod pass;

pub use pass::{Pass, PassBuilder, PassContext, PassNode};

use crate::registry::ResourceRegistry;

#[derive(Debug, thiserror::Error)]
pub enum FrameGraphError {
    #[error("circular dependency detected between frame graph passes")]
    CircularDependency,
}

/// Collects passes for one frame.
#[derive(Default)]
pub struct FrameGraph {
    passes: Vec<PassNode>,
}

impl FrameGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pass(&mut self, builder: PassBuilder) -> &mut Self {
        self.passes.push(builder.build());
        self
    }

    /// Resolve hazards into an execution order.
    pub fn build(self) -> Result<ExecutableFrameGraph, FrameGraphError> {
        let order = execution::execution_order(&self.passes)?;
        Ok(ExecutableFrameGraph {
            passes: self.passes,
            order,
        })
    }
}

/// Frame graph with a resolved execution order.
pub struct ExecutableFrameGraph {
    passes: Vec<PassNode>,
    order: Vec<usize>,
}

impl ExecutableFrameGraph {
    /// Record every pass in hazard order and submit the command buffers in
    /// a single batch.
    pub fn execute(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        resources: &ResourceRegistry,
    ) {
        let ctx = PassContext {
            device,
            queue,
            resources,
        };
        let command_buffers: Vec<_> = self
            .order
            .iter()
            .map(|&index| self.passes[index].pass().execute(&ctx))
            .collect();
        queue.submit(command_buffers);
    }

    /// Pass names in the order they will execute.
    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|&index| self.passes[index].name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Handle;

    struct NamedPass(&'static str);

    impl Pass for NamedPass {
        fn name(&self) -> &str {
            self.0
        }

        fn execute(&self, _ctx: &PassContext) -> wgpu::CommandBuffer {
            unreachable!("ordering tests never execute passes")
        }
    }

    // Marker types standing in for targets; the registry never sees them.
    struct SceneTex;
    struct BlurTex1;
    struct BlurTex2;

    #[test]
    fn writer_runs_before_reader_regardless_of_declaration_order() {
        let scene = Handle::<SceneTex>::next();
        let blur1 = Handle::<BlurTex1>::next();
        let blur2 = Handle::<BlurTex2>::next();

        // Declared backwards on purpose.
        let mut graph = FrameGraph::new();
        graph
            .add_pass(
                PassBuilder::new(Box::new(NamedPass("composite")))
                    .reads(scene)
                    .reads(blur2),
            )
            .add_pass(
                PassBuilder::new(Box::new(NamedPass("vertical")))
                    .reads(blur1)
                    .writes(blur2),
            )
            .add_pass(
                PassBuilder::new(Box::new(NamedPass("horizontal")))
                    .reads(scene)
                    .writes(blur1),
            )
            .add_pass(PassBuilder::new(Box::new(NamedPass("scene"))).writes(scene));

        let graph = graph.build().expect("acyclic graph");
        let order: Vec<_> = graph.pass_names().collect();
        assert_eq!(order, ["scene", "horizontal", "vertical", "composite"]);
    }

    #[test]
    fn same_resource_writes_keep_declaration_order() {
        let scene = Handle::<SceneTex>::next();

        let mut graph = FrameGraph::new();
        graph
            .add_pass(PassBuilder::new(Box::new(NamedPass("first"))).writes(scene))
            .add_pass(PassBuilder::new(Box::new(NamedPass("second"))).writes(scene));

        let graph = graph.build().expect("acyclic graph");
        let order: Vec<_> = graph.pass_names().collect();
        assert_eq!(order, ["first", "second"]);
    }

    #[test]
    fn mutual_producers_are_rejected() {
        let a = Handle::<SceneTex>::next();
        let b = Handle::<BlurTex1>::next();

        let mut graph = FrameGraph::new();
        graph
            .add_pass(
                PassBuilder::new(Box::new(NamedPass("ping")))
                    .reads(a)
                    .writes(b),
            )
            .add_pass(
                PassBuilder::new(Box::new(NamedPass("pong")))
                    .reads(b)
                    .writes(a),
            );

        assert!(matches!(
            graph.build(),
            Err(FrameGraphError::CircularDependency)
        ));
    }
}
