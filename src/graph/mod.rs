//! Indexed snapshot of the currently visible dependency graph.
//!
//! The snapshot assigns contiguous indices to all visible nodes with own
//! content and materializes their projected arcs. It is immutable and safe
//! to read from several places at once; the graph algorithms operate on it
//! exclusively. A snapshot taken before a collapse mutation can be detected
//! via its epoch stamp.

use crate::tree::{NodeId, ProjectTree};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// A flat, immutable view of the visible graph.
#[derive(Debug, Clone)]
pub struct VisibleGraph {
    /// Nodes are tree node ids, arcs are projected dependencies.
    inner: DiGraph<NodeId, ()>,
    index_of: HashMap<NodeId, usize>,
    epoch: u64,
}

impl VisibleGraph {
    /// Snapshots the projection of the whole tree under its current
    /// collapse state. Self arcs are suppressed, duplicates merged.
    pub fn new(tree: &ProjectTree) -> Self {
        let visible: Vec<NodeId> = tree
            .walk_subtree(tree.root())
            .into_iter()
            .filter(|&id| tree.has_own_content(id))
            .collect();

        let mut inner = DiGraph::with_capacity(visible.len(), 0);
        let mut index_of = HashMap::with_capacity(visible.len());
        for &id in &visible {
            let index = inner.add_node(id);
            index_of.insert(id, index.index());
        }
        for &id in &visible {
            let from = NodeIndex::new(index_of[&id]);
            for target in tree.visible_successors(id) {
                if let Some(&to) = index_of.get(&target) {
                    inner.update_edge(from, NodeIndex::new(to), ());
                }
            }
        }
        Self {
            inner,
            index_of,
            epoch: tree.epoch(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// The tree node behind an index.
    pub fn node_id(&self, index: usize) -> NodeId {
        self.inner[NodeIndex::new(index)]
    }

    /// The index of a tree node, if it is part of the snapshot.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index_of.get(&id).copied()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.node_weights().copied()
    }

    pub fn successors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.inner
            .neighbors(NodeIndex::new(index))
            .map(NodeIndex::index)
    }

    pub fn predecessors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.inner
            .neighbors_directed(NodeIndex::new(index), petgraph::Direction::Incoming)
            .map(NodeIndex::index)
    }

    /// Successor lists for all nodes, indexed by node index.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        (0..self.node_count())
            .map(|index| {
                let mut successors: Vec<usize> = self.successors(index).collect();
                successors.sort_unstable();
                successors
            })
            .collect()
    }

    /// All arcs as (from, to) index pairs.
    pub fn arcs(&self) -> Vec<(usize, usize)> {
        self.inner
            .edge_indices()
            .filter_map(|edge| self.inner.edge_endpoints(edge))
            .map(|(from, to)| (from.index(), to.index()))
            .collect()
    }

    /// The epoch of the tree at snapshot time.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// True while no collapse mutation happened since the snapshot.
    pub fn is_current(&self, tree: &ProjectTree) -> bool {
        self.epoch == tree.epoch()
    }

    /// Access to the underlying graph for traversal adaptors.
    pub fn inner(&self) -> &DiGraph<NodeId, ()> {
        &self.inner
    }

    /// The subgraph induced by the kept indices.
    pub fn restricted_to(&self, keep: &HashSet<usize>) -> VisibleGraph {
        self.restricted(keep, |_, _| true)
    }

    /// The subgraph of the kept indices with an additional arc predicate,
    /// evaluated on the indices of this snapshot.
    pub(crate) fn restricted(
        &self,
        keep: &HashSet<usize>,
        keep_arc: impl Fn(usize, usize) -> bool,
    ) -> VisibleGraph {
        let mut kept: Vec<usize> = keep.iter().copied().collect();
        kept.sort_unstable();

        let mut inner = DiGraph::with_capacity(kept.len(), 0);
        let mut index_of = HashMap::with_capacity(kept.len());
        let mut new_index = HashMap::with_capacity(kept.len());
        for &old in &kept {
            let id = self.node_id(old);
            let index = inner.add_node(id);
            index_of.insert(id, index.index());
            new_index.insert(old, index.index());
        }
        for &old in &kept {
            for successor in self.successors(old) {
                if keep.contains(&successor) && keep_arc(old, successor) {
                    inner.update_edge(
                        NodeIndex::new(new_index[&old]),
                        NodeIndex::new(new_index[&successor]),
                        (),
                    );
                }
            }
        }
        VisibleGraph {
            inner,
            index_of,
            epoch: self.epoch,
        }
    }

    /// A graph over the same nodes with replacement arcs, used for the
    /// transitive closure.
    pub(crate) fn with_arcs(&self, arcs: impl IntoIterator<Item = (usize, usize)>) -> VisibleGraph {
        let mut inner = DiGraph::with_capacity(self.node_count(), 0);
        for index in 0..self.node_count() {
            inner.add_node(self.node_id(index));
        }
        for (from, to) in arcs {
            inner.update_edge(NodeIndex::new(from), NodeIndex::new(to), ());
        }
        VisibleGraph {
            inner,
            index_of: self.index_of.clone(),
            epoch: self.epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::ArchiveKind;
    use crate::tree::{ContainerKind, ListMode};
    use std::collections::BTreeSet;

    fn refs(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn tree_with_cycle() -> ProjectTree {
        let mut tree = ProjectTree::new();
        let container = tree.add_container("dir:/src", ContainerKind::Directory);
        tree.add_class(container, "p.A", refs(&["p.B"]), false);
        tree.add_class(container, "p.B", refs(&["p.A"]), false);
        tree.add_class(container, "p.C", refs(&[]), false);
        tree.resolve_references();
        tree
    }

    #[test]
    fn test_snapshot_contains_only_content_nodes() {
        let tree = tree_with_cycle();
        let graph = VisibleGraph::new(&tree);
        // the container and the package are expanded, only classes count
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.arc_count(), 2);
    }

    #[test]
    fn test_indices_are_contiguous_and_stable() {
        let tree = tree_with_cycle();
        let graph = VisibleGraph::new(&tree);
        for index in 0..graph.node_count() {
            assert_eq!(graph.index_of(graph.node_id(index)), Some(index));
        }
    }

    #[test]
    fn test_rebuild_with_same_state_is_identical() {
        let tree = tree_with_cycle();
        let first = VisibleGraph::new(&tree);
        let second = VisibleGraph::new(&tree);
        let arcs = |graph: &VisibleGraph| {
            let mut arcs: Vec<(NodeId, NodeId)> = graph
                .arcs()
                .into_iter()
                .map(|(from, to)| (graph.node_id(from), graph.node_id(to)))
                .collect();
            arcs.sort();
            arcs
        };
        assert_eq!(arcs(&first), arcs(&second));
    }

    #[test]
    fn test_collapse_merges_nodes_and_drops_inner_arcs() {
        let mut tree = tree_with_cycle();
        let container = tree.containers()[0];
        let package = tree.find(container, "p").unwrap();
        tree.set_list_mode(package, ListMode::Collapsed).unwrap();

        let graph = VisibleGraph::new(&tree);
        // all classes roll up into the package; their mutual arcs vanish
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.arc_count(), 0);
        assert_eq!(graph.node_id(0), package);
    }

    #[test]
    fn test_epoch_staleness() {
        let mut tree = tree_with_cycle();
        let graph = VisibleGraph::new(&tree);
        assert!(graph.is_current(&tree));
        let container = tree.containers()[0];
        let package = tree.find(container, "p").unwrap();
        tree.set_list_mode(package, ListMode::Collapsed).unwrap();
        assert!(!graph.is_current(&tree));
    }

    #[test]
    fn test_restriction() {
        let tree = tree_with_cycle();
        let graph = VisibleGraph::new(&tree);
        let container = tree.containers()[0];
        let class_a = tree.find(container, "p.A").unwrap();
        let class_b = tree.find(container, "p.B").unwrap();
        let keep: HashSet<usize> = [class_a, class_b]
            .iter()
            .map(|&id| graph.index_of(id).unwrap())
            .collect();
        let restricted = graph.restricted_to(&keep);
        assert_eq!(restricted.node_count(), 2);
        assert_eq!(restricted.arc_count(), 2);
        assert!(restricted.index_of(class_a).is_some());
    }

    #[test]
    fn test_empty_archive_contributes_one_node_without_content() {
        let mut tree = ProjectTree::new();
        tree.add_container("jar:empty_jar", ContainerKind::Archive(ArchiveKind::Jar));
        tree.resolve_references();
        let graph = VisibleGraph::new(&tree);
        // expanded and empty: the archive node carries no own content
        assert_eq!(graph.node_count(), 0);
    }
}
