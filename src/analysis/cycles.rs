//! Strong connectivity via the algorithm of Tarjan.

use super::CancelToken;
use crate::error::Result;
use crate::graph::VisibleGraph;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Finds the components of strong connectivity of a snapshot.
///
/// The traversal is iterative, so deeply nested graphs cannot overflow the
/// call stack, and the cancellation token is observed once per outer root.
pub struct CycleFinder {
    components: Vec<Vec<usize>>,
}

impl CycleFinder {
    /// Runs the analysis on the given snapshot.
    pub fn analyze(graph: &VisibleGraph, cancel: &CancelToken) -> Result<Self> {
        let node_count = graph.node_count();
        let adjacency = graph.adjacency();

        // found_in_step doubles as the visited marker; step numbers start at 1
        let mut found_in_step = vec![0usize; node_count];
        let mut earliest_found = vec![0usize; node_count];
        let mut on_stack = vec![false; node_count];
        let mut stack: Vec<usize> = Vec::new();
        let mut next_step = 0usize;
        let mut components: Vec<Vec<usize>> = Vec::new();

        for root in 0..node_count {
            cancel.check()?;
            if found_in_step[root] != 0 {
                continue;
            }
            next_step += 1;
            found_in_step[root] = next_step;
            earliest_found[root] = next_step;
            stack.push(root);
            on_stack[root] = true;

            // frames of (node, position in its successor list)
            let mut frames: Vec<(usize, usize)> = vec![(root, 0)];
            while let Some(frame) = frames.last_mut() {
                let node = frame.0;
                if frame.1 < adjacency[node].len() {
                    let successor = adjacency[node][frame.1];
                    frame.1 += 1;
                    if found_in_step[successor] == 0 {
                        next_step += 1;
                        found_in_step[successor] = next_step;
                        earliest_found[successor] = next_step;
                        stack.push(successor);
                        on_stack[successor] = true;
                        frames.push((successor, 0));
                    } else if on_stack[successor] {
                        earliest_found[node] =
                            earliest_found[node].min(earliest_found[successor]);
                    }
                } else {
                    frames.pop();
                    if earliest_found[node] == found_in_step[node] {
                        let mut component = Vec::new();
                        while let Some(other) = stack.pop() {
                            on_stack[other] = false;
                            component.push(other);
                            if other == node {
                                break;
                            }
                        }
                        components.push(component);
                    }
                    if let Some(parent_frame) = frames.last() {
                        let parent = parent_frame.0;
                        earliest_found[parent] =
                            earliest_found[parent].min(earliest_found[node]);
                    }
                }
            }
        }

        components.sort_by_key(|component| {
            (
                Reverse(component.len()),
                component.iter().copied().min().unwrap_or(0),
            )
        });
        Ok(Self { components })
    }

    /// Components sorted by descending size, ties broken by the smallest
    /// contained index. Every node appears in exactly one component.
    pub fn strong_components(&self) -> &[Vec<usize>] {
        &self.components
    }

    /// Components of at least two nodes, i.e. real cycles.
    pub fn cycle_components(&self) -> impl Iterator<Item = &Vec<usize>> {
        self.components
            .iter()
            .filter(|component| component.len() > 1)
    }

    /// The subgraph induced by all nodes on cycles. Arcs between different
    /// components are dropped; within a component all arcs survive.
    pub fn cycle_subgraph(&self, graph: &VisibleGraph) -> VisibleGraph {
        let mut component_of = vec![usize::MAX; graph.node_count()];
        let mut keep = HashSet::new();
        for (number, component) in self.components.iter().enumerate() {
            for &node in component {
                component_of[node] = number;
            }
            if component.len() > 1 {
                keep.extend(component.iter().copied());
            }
        }
        graph.restricted(&keep, |from, to| component_of[from] == component_of[to])
    }
}
