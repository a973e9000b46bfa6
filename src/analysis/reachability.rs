//! Reachability on the visible graph.

use crate::graph::VisibleGraph;
use petgraph::graph::NodeIndex;
use petgraph::visit::{Dfs, Reversed};
use std::collections::HashSet;

/// The set of indices reachable from the start indices, including the
/// starts themselves. `forward` follows successors, otherwise predecessors.
pub fn reachable_from(
    graph: &VisibleGraph,
    starts: impl IntoIterator<Item = usize>,
    forward: bool,
) -> HashSet<usize> {
    let inner = graph.inner();
    let mut reached = HashSet::new();
    for start in starts {
        let start_index = NodeIndex::new(start);
        if forward {
            let mut dfs = Dfs::new(inner, start_index);
            while let Some(node) = dfs.next(inner) {
                reached.insert(node.index());
            }
        } else {
            let reversed = Reversed(inner);
            let mut dfs = Dfs::new(reversed, start_index);
            while let Some(node) = dfs.next(reversed) {
                reached.insert(node.index());
            }
        }
    }
    reached
}

/// The subgraph induced by everything implied by one node: its forward
/// reach if `use_successors`, its backward reach otherwise.
pub fn implied_by(graph: &VisibleGraph, node: usize, use_successors: bool) -> VisibleGraph {
    let keep = reachable_from(graph, [node], use_successors);
    graph.restricted_to(&keep)
}
