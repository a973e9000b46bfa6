//! Transitive closure and edge density.

use super::CancelToken;
use crate::error::{AnalysisError, Result};
use crate::graph::VisibleGraph;

/// Computes the transitive closure of a snapshot: node i gets an arc to
/// every node reachable from it. A node reaches itself only through a
/// cycle. Cancellation is observed once per start node.
pub fn transitive_closure(graph: &VisibleGraph, cancel: &CancelToken) -> Result<VisibleGraph> {
    let node_count = graph.node_count();
    let adjacency = graph.adjacency();
    let mut arcs: Vec<(usize, usize)> = Vec::new();

    for start in 0..node_count {
        cancel.check()?;
        let mut reached = vec![false; node_count];
        // seeded with the successors, so `start` itself only turns up again
        // via a cycle
        let mut pending = adjacency[start].clone();
        while let Some(node) = pending.pop() {
            if !reached[node] {
                reached[node] = true;
                pending.extend(adjacency[node].iter().copied());
            }
        }
        for (node, &hit) in reached.iter().enumerate() {
            if hit {
                arcs.push((start, node));
            }
        }
    }
    Ok(graph.with_arcs(arcs))
}

/// The classical edge density m / (n * (n - 1)). Undefined below two nodes.
pub fn edge_density(graph: &VisibleGraph) -> Result<f64> {
    let nodes = graph.node_count();
    if nodes < 2 {
        return Err(AnalysisError::EmptyGraphDensity { nodes });
    }
    Ok(graph.arc_count() as f64 / (nodes * (nodes - 1)) as f64)
}

/// The edge density of the transitive closure. This measure distinguishes
/// differently complicated graphs with the same number of nodes and arcs.
pub fn transitive_density(graph: &VisibleGraph, cancel: &CancelToken) -> Result<f64> {
    edge_density(&transitive_closure(graph, cancel)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ContainerKind, ProjectTree};
    use std::collections::BTreeSet;

    fn graph_of(arcs: &[(&str, &str)], isolated: &[&str]) -> (ProjectTree, VisibleGraph) {
        let mut tree = ProjectTree::new();
        let container = tree.add_container("dir:/src", ContainerKind::Directory);
        let mut names: Vec<&str> = arcs
            .iter()
            .flat_map(|(from, to)| [*from, *to])
            .chain(isolated.iter().copied())
            .collect();
        names.sort_unstable();
        names.dedup();
        for &name in &names {
            let references: BTreeSet<String> = arcs
                .iter()
                .filter(|(from, _)| *from == name)
                .map(|(_, to)| to.to_string())
                .collect();
            tree.add_class(container, name, references, false);
        }
        tree.resolve_references();
        let graph = VisibleGraph::new(&tree);
        (tree, graph)
    }

    fn closure_arcs(tree: &ProjectTree, closure: &VisibleGraph) -> Vec<(String, String)> {
        let mut arcs: Vec<(String, String)> = closure
            .arcs()
            .into_iter()
            .map(|(from, to)| {
                (
                    tree.display_name(closure.node_id(from)),
                    tree.display_name(closure.node_id(to)),
                )
            })
            .collect();
        arcs.sort();
        arcs
    }

    #[test]
    fn test_closure_of_a_chain() {
        let (tree, graph) = graph_of(&[("A", "B"), ("B", "C")], &[]);
        let closure = transitive_closure(&graph, &CancelToken::new()).unwrap();
        assert_eq!(
            closure_arcs(&tree, &closure),
            vec![
                ("A".to_string(), "B".to_string()),
                ("A".to_string(), "C".to_string()),
                ("B".to_string(), "C".to_string()),
            ]
        );
    }

    #[test]
    fn test_closure_contains_self_only_on_cycles() {
        let (tree, graph) = graph_of(&[("A", "B"), ("B", "A"), ("B", "C")], &[]);
        let closure = transitive_closure(&graph, &CancelToken::new()).unwrap();
        let arcs = closure_arcs(&tree, &closure);
        assert!(arcs.contains(&("A".to_string(), "A".to_string())));
        assert!(arcs.contains(&("B".to_string(), "B".to_string())));
        assert!(!arcs.contains(&("C".to_string(), "C".to_string())));
    }

    #[test]
    fn test_closure_is_transitive() {
        let (_, graph) = graph_of(&[("A", "B"), ("B", "C"), ("C", "D"), ("B", "D")], &[]);
        let closure = transitive_closure(&graph, &CancelToken::new()).unwrap();
        let adjacency = closure.adjacency();
        for from in 0..closure.node_count() {
            for &via in &adjacency[from] {
                for &to in &adjacency[via] {
                    assert!(
                        adjacency[from].contains(&to),
                        "missing transitive arc {from}->{to}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_density() {
        // 4 nodes, 6 arcs -> 6 / 12
        let (_, graph) = graph_of(
            &[
                ("A", "B"),
                ("A", "C"),
                ("B", "C"),
                ("C", "D"),
                ("D", "A"),
                ("B", "D"),
            ],
            &[],
        );
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.arc_count(), 6);
        let density = edge_density(&graph).unwrap();
        assert!((density - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_density_of_tiny_graphs_is_an_error() {
        let (_, graph) = graph_of(&[], &["A"]);
        assert_eq!(graph.node_count(), 1);
        assert!(matches!(
            edge_density(&graph),
            Err(AnalysisError::EmptyGraphDensity { nodes: 1 })
        ));
        let (_, empty) = graph_of(&[], &[]);
        assert!(matches!(
            edge_density(&empty),
            Err(AnalysisError::EmptyGraphDensity { nodes: 0 })
        ));
    }

    #[test]
    fn test_transitive_density_exceeds_plain_density() {
        let (_, graph) = graph_of(&[("A", "B"), ("B", "C"), ("C", "D")], &[]);
        let plain = edge_density(&graph).unwrap();
        let transitive = transitive_density(&graph, &CancelToken::new()).unwrap();
        assert!(transitive > plain);
    }

    #[test]
    fn test_cancellation() {
        let (_, graph) = graph_of(&[("A", "B")], &[]);
        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            transitive_closure(&graph, &token),
            Err(AnalysisError::Cancelled)
        ));
    }
}
