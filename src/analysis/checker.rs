//! Finds unreferenced classes and archives relative to the entry points.
//!
//! Reachability here works on the full unprojected graph at class leaf
//! granularity; collapse state plays no role.

use crate::filter::Filter;
use crate::tree::{ContainerKind, NodeId, ProjectTree};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Checks which elements of the project nothing refers to.
pub struct ReferenceChecker<'a> {
    tree: &'a ProjectTree,
    filter: &'a Filter,
    known_needed_classes: Vec<String>,
    known_needed_archives: Vec<Regex>,
}

impl<'a> ReferenceChecker<'a> {
    pub fn new(tree: &'a ProjectTree, filter: &'a Filter) -> Self {
        Self {
            tree,
            filter,
            known_needed_classes: Vec::new(),
            known_needed_archives: Vec::new(),
        }
    }

    /// Declares additional entry classes which are needed even though no
    /// automatic detection finds them, for instance classes called only via
    /// reflection.
    pub fn add_known_needed_classes<S: AsRef<str>>(&mut self, names: &[S]) {
        self.known_needed_classes
            .extend(names.iter().map(|name| name.as_ref().to_string()));
    }

    /// Declares archives needed at runtime without any class reference,
    /// logging backends being the usual case. A pattern suppresses an
    /// archive whose display name equals it or matches it as a regular
    /// expression.
    pub fn add_known_needed_archives<S: AsRef<str>>(
        &mut self,
        patterns: &[S],
    ) -> Result<(), regex::Error> {
        for pattern in patterns {
            self.known_needed_archives
                .push(Regex::new(&format!("^(?:{})$", pattern.as_ref()))?);
        }
        Ok(())
    }

    /// All entry point classes: those with a `public static void
    /// main(String[])` method plus the declared known-needed classes.
    pub fn entry_points(&self) -> Vec<NodeId> {
        let mut entries: Vec<NodeId> = self
            .tree
            .classes_in_subtree(self.tree.root())
            .into_iter()
            .filter(|&class| self.tree.has_main(class))
            .collect();
        for name in &self.known_needed_classes {
            if let Some(class) = self.tree.find_class(name) {
                if !entries.contains(&class) {
                    entries.push(class);
                }
            } else {
                debug!("Known needed class not on the classpath: {name}");
            }
        }
        entries
    }

    /// Focus classes which no entry point reaches.
    pub fn unreferenced_classes(&self) -> Vec<NodeId> {
        let reachable = self.reachable_classes();
        let mut unreferenced: Vec<NodeId> = self
            .tree
            .classes_in_subtree(self.tree.root())
            .into_iter()
            .filter(|&class| self.filter.is_in_focus(&self.tree.name(class)))
            .filter(|class| !reachable.contains(class))
            .collect();
        unreferenced.sort_by_key(|&class| self.tree.name(class));
        unreferenced
    }

    /// Non-focus archives none of whose classes any entry point reaches.
    /// An archive without classes is unreferenced by definition.
    pub fn unreferenced_archives(&self) -> Vec<NodeId> {
        let reachable = self.reachable_classes();
        let mut unreferenced: Vec<NodeId> = self
            .tree
            .containers()
            .iter()
            .copied()
            .filter(|&container| {
                matches!(
                    self.tree.container_kind(container),
                    Some(ContainerKind::Archive(_))
                )
            })
            .filter(|&container| !self.filter.is_in_focus(&self.tree.name(container)))
            .filter(|&container| {
                self.tree
                    .classes_in_subtree(container)
                    .iter()
                    .all(|class| !reachable.contains(class))
            })
            .filter(|&container| {
                let display = self.tree.display_name(container);
                !self
                    .known_needed_archives
                    .iter()
                    .any(|pattern| pattern.is_match(&display))
            })
            .collect();
        unreferenced.sort_by_key(|&container| self.tree.name(container));
        unreferenced
    }

    /// Everything the entry points reach, including the entry points.
    fn reachable_classes(&self) -> HashSet<NodeId> {
        let mut reachable: HashSet<NodeId> = HashSet::new();
        let mut pending = self.entry_points();
        while let Some(class) = pending.pop() {
            if reachable.insert(class) {
                pending.extend(self.tree.resolved_references(class));
            }
        }
        reachable
    }

    /// Both reports with display names, ready for output.
    pub fn report(&self) -> UnreferencedReport {
        UnreferencedReport {
            classes: self
                .unreferenced_classes()
                .iter()
                .map(|&class| self.tree.display_name(class))
                .collect(),
            archives: self
                .unreferenced_archives()
                .iter()
                .map(|&archive| self.tree.display_name(archive))
                .collect(),
        }
    }
}

/// Display names of all unreferenced elements.
#[derive(Debug, Clone, Serialize)]
pub struct UnreferencedReport {
    pub classes: Vec<String>,
    pub archives: Vec<String>,
}

impl UnreferencedReport {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.archives.is_empty()
    }
}
