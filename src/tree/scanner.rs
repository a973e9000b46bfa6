//! Builds the project tree from a classpath in one pass.

use super::{ContainerKind, NodeId, ProjectTree};
use crate::bytecode;
use crate::classpath::{Classpath, ClasspathEntry, SkippedContainer};
use crate::error::Result;
use crate::filter::Filter;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// Result of one scan pass: the finished tree plus the containers which had
/// to be skipped because they could not be opened.
#[derive(Debug)]
pub struct ScannedProject {
    pub tree: ProjectTree,
    pub skipped: Vec<SkippedContainer>,
}

/// Drives enumeration and extraction, assembles the tree and resolves all
/// references. The tree is built exactly once; afterwards only collapse
/// state may change.
pub struct ProjectScanner<'a> {
    filter: &'a Filter,
}

impl<'a> ProjectScanner<'a> {
    pub fn new(filter: &'a Filter) -> Self {
        Self { filter }
    }

    pub fn scan(&self, classpath: &Classpath) -> Result<ScannedProject> {
        let mut tree = ProjectTree::new();

        // Containers exist even when empty; an archive without classes still
        // shows up (and is then unreferenced).
        let mut containers: HashMap<String, NodeId> = HashMap::new();
        for entry in &classpath.entries {
            let name = entry.container_name();
            if self.filter.is_ignored_source(&name) {
                continue;
            }
            let id = tree.add_container(&name, container_kind(entry));
            containers.insert(name, id);
        }

        let filter = self.filter;
        let skipped = classpath.each_class(filter, |resource| {
            let summary = match bytecode::extract(&resource.bytes) {
                Ok(summary) => summary,
                Err(error) => {
                    warn!(
                        "Skipping {} in {}: {}",
                        resource.class_path,
                        resource.container,
                        error.with_context(resource.class_path.clone())
                    );
                    return Ok(());
                }
            };
            let class_name = resource.class_path.replace('/', ".");
            if filter.is_ignored_class(&class_name) {
                return Ok(());
            }
            if summary.class_name != class_name {
                warn!(
                    "Class name {} does not match entry path {} in {}",
                    summary.class_name, resource.class_path, resource.container
                );
            }
            let references: BTreeSet<String> = summary
                .references
                .into_iter()
                .filter(|name| !filter.is_ignored_class(name))
                .collect();
            if let Some(&container) = containers.get(&resource.container) {
                tree.add_class(container, &class_name, references, summary.has_main);
            }
            Ok(())
        })?;

        tree.resolve_references();
        info!(
            "Scanned {} classes in {} containers",
            tree.class_count(),
            tree.containers().len()
        );
        Ok(ScannedProject { tree, skipped })
    }
}

fn container_kind(entry: &ClasspathEntry) -> ContainerKind {
    match entry {
        ClasspathEntry::Directory(_) => ContainerKind::Directory,
        ClasspathEntry::Archive { kind, .. } => ContainerKind::Archive(*kind),
    }
}
