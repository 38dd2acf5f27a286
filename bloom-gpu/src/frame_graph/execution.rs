use super::FrameGraphError;
use super::pass::PassNode;
use std::collections::VecDeque;

/// Schedule passes so every write lands before the reads that depend on it.
///
/// Hazard edges: read-after-write orients writer before reader, whatever the
/// declaration order; write-after-write on the same resource keeps
/// declaration order. Two passes that each read what the other writes form a
/// genuine cycle and are rejected.
pub(super) fn execution_order(passes: &[PassNode]) -> Result<Vec<usize>, FrameGraphError> {
    let n = passes.len();
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];

    let add_edge =
        |edges: &mut Vec<Vec<usize>>, in_degree: &mut Vec<usize>, from: usize, to: usize| {
            if !edges[from].contains(&to) {
                edges[from].push(to);
                in_degree[to] += 1;
            }
        };

    for producer in 0..n {
        for consumer in 0..n {
            if producer != consumer
                && !passes[producer].writes().is_disjoint(passes[consumer].reads())
            {
                add_edge(&mut edges, &mut in_degree, producer, consumer);
            }
        }
    }
    for earlier in 0..n {
        for later in (earlier + 1)..n {
            if !passes[earlier].writes().is_disjoint(passes[later].writes()) {
                add_edge(&mut edges, &mut in_degree, earlier, later);
            }
        }
    }

    // Kahn's algorithm, seeded in declaration order so unrelated passes keep
    // a stable ordering.
    let mut ready: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(index) = ready.pop_front() {
        order.push(index);
        for &next in &edges[index] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    if order.len() != n {
        return Err(FrameGraphError::CircularDependency);
    }
    Ok(order)
}
