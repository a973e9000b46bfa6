//! The hierarchy of containers, packages and classes.
//!
//! Nodes form a single-rooted tree where all leaves are classes. Raw
//! dependency arcs live on the class leaves; every coarser view is derived
//! by projecting those arcs through the current collapse state. Collapse
//! state changes never alter raw arcs or tree structure.

pub mod names;
mod scanner;

pub use names::{display_name, SEPARATOR};
pub use scanner::{ProjectScanner, ScannedProject};

use crate::classpath::ArchiveKind;
use crate::error::{AnalysisError, Result};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// Index of a node in the tree arena. Stable for the lifetime of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Defines how children are listed and where dependencies are addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    /// All children listed separately.
    #[default]
    Expanded,
    /// Direct class leaves collapsed into this node, other children listed.
    LeafsCollapsed,
    /// All children hidden, dependencies of the whole subtree on this node.
    Collapsed,
}

impl FromStr for ListMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "EXPANDED" => Ok(ListMode::Expanded),
            "LEAFS_COLLAPSED" => Ok(ListMode::LeafsCollapsed),
            "COLLAPSED" => Ok(ListMode::Collapsed),
            other => Err(format!("unknown list mode: {other}")),
        }
    }
}

/// What a container node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Root,
    Directory,
    Archive(ArchiveKind),
    Package,
}

#[derive(Debug, Default)]
struct ClassInfo {
    /// Referenced qualified class names as extracted, after filtering.
    raw_references: BTreeSet<String>,
    /// Class nodes the raw references resolved to.
    resolved: Vec<NodeId>,
    /// Inverse of `resolved`, filled by the same resolution pass.
    referenced_by: Vec<NodeId>,
    has_main: bool,
}

#[derive(Debug)]
enum NodeKind {
    Container { kind: ContainerKind },
    Class(ClassInfo),
}

#[derive(Debug)]
struct NodeData {
    parent: Option<NodeId>,
    simple_name: String,
    list_mode: ListMode,
    /// Children by simple name; unique per parent, ordered by name.
    children: BTreeMap<String, NodeId>,
    kind: NodeKind,
}

/// The single-rooted tree built once per analysis.
///
/// List modes may be mutated at any time; such mutations are not
/// synchronized against concurrent projection reads, the caller serializes.
#[derive(Debug)]
pub struct ProjectTree {
    nodes: Vec<NodeData>,
    /// Top level containers in classpath order, for reference resolution.
    container_order: Vec<NodeId>,
    epoch: u64,
}

impl ProjectTree {
    pub fn new() -> Self {
        let root = NodeData {
            parent: None,
            simple_name: String::new(),
            list_mode: ListMode::Expanded,
            children: BTreeMap::new(),
            kind: NodeKind::Container {
                kind: ContainerKind::Root,
            },
        };
        Self {
            nodes: vec![root],
            container_order: Vec::new(),
            epoch: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Monotonic counter bumped on every effective collapse state change.
    /// Snapshots are stamped with it to detect staleness.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn class_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Class(_)))
            .count()
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn class_info(&self, id: NodeId) -> Option<&ClassInfo> {
        match &self.node(id).kind {
            NodeKind::Class(info) => Some(info),
            NodeKind::Container { .. } => None,
        }
    }

    pub fn is_class(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Class(_))
    }

    pub fn container_kind(&self, id: NodeId) -> Option<ContainerKind> {
        match self.node(id).kind {
            NodeKind::Container { kind } => Some(kind),
            NodeKind::Class(_) => None,
        }
    }

    pub fn has_main(&self, id: NodeId) -> bool {
        self.class_info(id).map(|info| info.has_main).unwrap_or(false)
    }

    /// Raw referenced names of a class leaf, after filtering.
    pub fn raw_references(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.class_info(id)
            .into_iter()
            .flat_map(|info| info.raw_references.iter().map(String::as_str))
    }

    /// Class nodes this class leaf depends on.
    pub fn resolved_references(&self, id: NodeId) -> &[NodeId] {
        self.class_info(id)
            .map(|info| info.resolved.as_slice())
            .unwrap_or(&[])
    }

    /// Class nodes depending on this class leaf.
    pub fn referencing_classes(&self, id: NodeId) -> &[NodeId] {
        self.class_info(id)
            .map(|info| info.referenced_by.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).children.values().copied()
    }

    /// Top level containers in classpath order.
    pub fn containers(&self) -> &[NodeId] {
        &self.container_order
    }

    pub fn simple_name(&self, id: NodeId) -> &str {
        &self.node(id).simple_name
    }

    /// The fully qualified name; empty for the root.
    pub fn name(&self, id: NodeId) -> String {
        match self.node(id).parent {
            Some(parent) => names::join(&self.name(parent), &self.node(id).simple_name),
            None => self.node(id).simple_name.clone(),
        }
    }

    /// A human-readable name, stripped of the container origin encoding.
    pub fn display_name(&self, id: NodeId) -> String {
        names::display_name(&self.name(id))
    }

    /// The name relative to an ancestor, or the simple name if both are the
    /// same node. None if `ancestor` is not on the path to the root.
    pub fn relative_name(&self, id: NodeId, ancestor: NodeId) -> Option<String> {
        if id == ancestor || self.node(id).parent == Some(ancestor) {
            return Some(self.node(id).simple_name.clone());
        }
        let parent = self.node(id).parent?;
        let prefix = self.relative_name(parent, ancestor)?;
        Some(names::join(&prefix, &self.node(id).simple_name))
    }

    pub fn list_mode(&self, id: NodeId) -> ListMode {
        self.node(id).list_mode
    }

    /// Changes how the node's children are projected. No cascading. The
    /// root cannot be collapsed.
    pub fn set_list_mode(&mut self, id: NodeId, mode: ListMode) -> Result<()> {
        if id == self.root() && mode == ListMode::Collapsed {
            return Err(AnalysisError::InvalidCollapse);
        }
        if self.node(id).list_mode != mode {
            self.node_mut(id).list_mode = mode;
            self.epoch += 1;
        }
        Ok(())
    }

    /// Restores EXPANDED on every node.
    pub fn reset_list_modes(&mut self) {
        let mut changed = false;
        for node in &mut self.nodes {
            if node.list_mode != ListMode::Expanded {
                node.list_mode = ListMode::Expanded;
                changed = true;
            }
        }
        if changed {
            self.epoch += 1;
        }
    }

    /// Collapses class leaves into their packages everywhere, leaving the
    /// container and package structure visible.
    pub fn collapse_leafs(&mut self) {
        let mut changed = false;
        for node in &mut self.nodes {
            if matches!(node.kind, NodeKind::Container { .. })
                && node.list_mode == ListMode::Expanded
            {
                node.list_mode = ListMode::LeafsCollapsed;
                changed = true;
            }
        }
        if changed {
            self.epoch += 1;
        }
    }

    /// Creates a top level container under the root, or returns the
    /// existing one of the same name.
    pub fn add_container(&mut self, simple_name: &str, kind: ContainerKind) -> NodeId {
        if let Some(&existing) = self.node(self.root()).children.get(simple_name) {
            return existing;
        }
        let id = self.push_node(self.root(), simple_name, NodeKind::Container { kind });
        self.container_order.push(id);
        id
    }

    /// Adds a class leaf under a container, creating intermediate package
    /// nodes as needed. Idempotent: adding the same path again returns the
    /// existing leaf unchanged.
    pub fn add_class(
        &mut self,
        container: NodeId,
        class_relative_path: &str,
        references: BTreeSet<String>,
        has_main: bool,
    ) -> NodeId {
        let mut current = container;
        let mut remaining = class_relative_path;
        loop {
            let (head, rest) = names::split_first(remaining);
            match rest {
                Some(rest_path) => {
                    current = match self.node(current).children.get(head) {
                        Some(&child) => child,
                        None => self.push_node(
                            current,
                            head,
                            NodeKind::Container {
                                kind: ContainerKind::Package,
                            },
                        ),
                    };
                    remaining = rest_path;
                }
                None => {
                    if let Some(&existing) = self.node(current).children.get(head) {
                        return existing;
                    }
                    return self.push_node(
                        current,
                        head,
                        NodeKind::Class(ClassInfo {
                            raw_references: references,
                            has_main,
                            ..ClassInfo::default()
                        }),
                    );
                }
            }
        }
    }

    fn push_node(&mut self, parent: NodeId, simple_name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            parent: Some(parent),
            simple_name: simple_name.to_string(),
            list_mode: ListMode::Expanded,
            children: BTreeMap::new(),
            kind,
        });
        self.node_mut(parent)
            .children
            .insert(simple_name.to_string(), id);
        id
    }

    /// Walks child by child down the tree. Returns the addressed node even
    /// if it is inside a collapsed ancestor, or None if a segment is
    /// missing.
    pub fn find(&self, from: NodeId, relative_path: &str) -> Option<NodeId> {
        let (head, rest) = names::split_first(relative_path);
        let child = *self.node(from).children.get(head)?;
        match rest {
            Some(rest_path) => self.find(child, rest_path),
            None => Some(child),
        }
    }

    /// Looks a qualified class name up across all top level containers in
    /// classpath order; the first match wins.
    pub fn find_class(&self, qualified_name: &str) -> Option<NodeId> {
        self.container_order
            .iter()
            .filter_map(|&container| self.find(container, qualified_name))
            .find(|&id| self.is_class(id))
    }

    /// True if `ancestor` contains `other`, or both are the same node.
    pub fn is_ancestor(&self, ancestor: NodeId, other: NodeId) -> bool {
        let mut current = Some(other);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// The node currently standing in for this one: the outermost collapsed
    /// ancestor, or the immediate parent with collapsed leaves if this is a
    /// class, or the node itself when all ancestors are expanded.
    pub fn representative(&self, id: NodeId) -> NodeId {
        let mut result = id;
        let mut accept_leafs_collapsed = self.is_class(id);
        let mut ancestor = self.node(id).parent;
        while let Some(current) = ancestor {
            let mode = self.node(current).list_mode;
            if mode == ListMode::Collapsed
                || (accept_leafs_collapsed && mode == ListMode::LeafsCollapsed)
            {
                result = current;
            }
            ancestor = self.node(current).parent;
            accept_leafs_collapsed = false;
        }
        result
    }

    /// Depth-first traversal of the visible part of the subtree, excluding
    /// the start node. Children of COLLAPSED nodes are skipped; under
    /// LEAFS_COLLAPSED only class leaves are skipped.
    pub fn walk_subtree(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk_visible(start, &mut out);
        out
    }

    fn walk_visible(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let mode = self.node(node).list_mode;
        if mode == ListMode::Collapsed {
            return;
        }
        for child in self.node(node).children.values() {
            if mode == ListMode::LeafsCollapsed && self.is_class(*child) {
                continue;
            }
            out.push(*child);
            self.walk_visible(*child, out);
        }
    }

    /// All class leaves in the subtree, regardless of collapse state.
    pub fn classes_in_subtree(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_classes(start, &mut out);
        out
    }

    fn collect_classes(&self, node: NodeId, out: &mut Vec<NodeId>) {
        if self.is_class(node) {
            out.push(node);
            return;
        }
        for child in self.node(node).children.values() {
            self.collect_classes(*child, out);
        }
    }

    /// True if at least one class is represented by this node itself and
    /// not by some listed child.
    pub fn has_own_content(&self, id: NodeId) -> bool {
        match self.node(id).list_mode {
            _ if self.is_class(id) => true,
            ListMode::Collapsed => !self.classes_in_subtree(id).is_empty(),
            ListMode::LeafsCollapsed => self.children(id).any(|child| self.is_class(child)),
            ListMode::Expanded => false,
        }
    }

    /// The nodes this node depends on under the current collapse state.
    /// Hidden targets are replaced by their representative; self loops at
    /// the representative level are suppressed.
    pub fn visible_successors(&self, id: NodeId) -> Vec<NodeId> {
        self.project(id, true)
    }

    /// The nodes depending on this node, with the same collapse handling.
    pub fn visible_predecessors(&self, id: NodeId) -> Vec<NodeId> {
        self.project(id, false)
    }

    fn project(&self, id: NodeId, forward: bool) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for class in self.classes_in_subtree(id) {
            if let Some(info) = self.class_info(class) {
                let arcs = if forward {
                    &info.resolved
                } else {
                    &info.referenced_by
                };
                for &linked in arcs {
                    let representative = self.representative(linked);
                    if representative != id && seen.insert(representative) {
                        result.push(representative);
                    }
                }
            }
        }
        result
    }

    /// The class pairs witnessing that `from` depends on `to`: (a, b) where
    /// a is a class in the subtree of `from`, b one in the subtree of `to`,
    /// and a references b. Looks into collapsed nodes. Empty if there is no
    /// dependency.
    pub fn dependency_reason(&self, from: NodeId, to: NodeId) -> Vec<(NodeId, NodeId)> {
        let mut result = Vec::new();
        for class in self.classes_in_subtree(from) {
            if let Some(info) = self.class_info(class) {
                for &target in &info.resolved {
                    if self.is_ancestor(to, target) {
                        result.push((class, target));
                    }
                }
            }
        }
        result
    }

    /// Same as [`dependency_reason`](Self::dependency_reason) but as pairs
    /// of short relative names.
    pub fn explain_dependency(&self, from: NodeId, to: NodeId) -> Vec<(String, String)> {
        self.dependency_reason(from, to)
            .into_iter()
            .filter_map(|(a, b)| {
                Some((self.relative_name(a, from)?, self.relative_name(b, to)?))
            })
            .collect()
    }

    /// Resolves every raw reference against the tree and installs forward
    /// and reverse links. Called once after the build pass; raw arcs are
    /// immutable afterwards. Unresolved references are discarded, the
    /// target is outside the classpath or filtered out.
    pub fn resolve_references(&mut self) {
        let class_ids: Vec<NodeId> = (0..self.nodes.len())
            .map(NodeId)
            .filter(|&id| self.is_class(id))
            .collect();
        for &class in &class_ids {
            let raw: Vec<String> = self.raw_references(class).map(str::to_string).collect();
            let mut unique: Vec<NodeId> = Vec::new();
            for name in &raw {
                if let Some(target) = self.find_class(name) {
                    if target != class && !unique.contains(&target) {
                        unique.push(target);
                    }
                }
            }
            for &target in &unique {
                if let NodeKind::Class(info) = &mut self.node_mut(target).kind {
                    info.referenced_by.push(class);
                }
            }
            if let NodeKind::Class(info) = &mut self.node_mut(class).kind {
                info.resolved = unique;
            }
        }
    }
}

impl Default for ProjectTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
