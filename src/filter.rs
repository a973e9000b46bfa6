//! Decides which sources are opened, which referenced classes become arcs,
//! and which elements are "in focus" (analyzed vs. taken for granted).

use regex::Regex;
use tracing::debug;

/// Three ordered rule sets of regular expressions. Patterns match the whole
/// name, not a substring.
#[derive(Debug)]
pub struct Filter {
    ignored_class_names: Vec<Regex>,
    ignored_sources: Vec<Regex>,
    focus: Vec<Regex>,
}

impl Filter {
    /// Creates a filter which focuses on classes given as class files in
    /// directories and ignores java platform classes.
    pub fn new() -> Self {
        let mut filter = Self {
            ignored_class_names: Vec::new(),
            ignored_sources: Vec::new(),
            focus: Vec::new(),
        };
        for pattern in [r"java\..*", ".*module-info", r"META-INF\..*"] {
            filter.add_ignored_class_name(pattern).expect("stock pattern");
        }
        for pattern in [
            ".*/jre/lib/.*",
            ".*/build/resources/.*",
            r".*/configuration/org.eclipse.*/\.cp",
        ] {
            filter.add_ignored_source(pattern).expect("stock pattern");
        }
        filter.add_focus("dir:.*").expect("stock pattern");
        filter
    }

    /// Adds a regular expression for fully qualified class names to ignore.
    /// Matching classes are not analyzed and dependencies to them are taken
    /// for granted.
    pub fn add_ignored_class_name(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.ignored_class_names.push(compile_anchored(pattern)?);
        Ok(())
    }

    /// Adds a regular expression for container names which are not opened.
    pub fn add_ignored_source(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.ignored_sources.push(compile_anchored(pattern)?);
        Ok(())
    }

    /// Adds a regular expression for node names considered part of the
    /// project under analysis.
    pub fn add_focus(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.focus.push(compile_anchored(pattern)?);
        Ok(())
    }

    /// Returns true if the name denotes a source not to be parsed.
    pub fn is_ignored_source(&self, name: &str) -> bool {
        let ignored = self.ignored_sources.iter().any(|p| p.is_match(name));
        if ignored {
            debug!("Ignoring source: {name}");
        }
        ignored
    }

    /// Returns true if the name is the class name of an ignored class.
    /// Dependencies to such classes are dropped and taken for granted.
    pub fn is_ignored_class(&self, name: &str) -> bool {
        self.ignored_class_names.iter().any(|p| p.is_match(name))
    }

    /// Returns true if the name denotes an element which should undergo all
    /// analyzing procedures, namely something with source code in the
    /// analyzed project.
    pub fn is_in_focus(&self, name: &str) -> bool {
        self.focus.iter().any(|p| p.is_match(name))
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

/// The rule sets mimic full matching, so user patterns are anchored before
/// compilation.
fn compile_anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}
