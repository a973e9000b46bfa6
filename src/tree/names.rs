//! Qualified name utilities.
//!
//! Node names are dot-separated paths. Top level children carry an origin
//! prefix (`dir:/opt/app/classes` or `jar:slf4j-simple-1_7_25_jar`) so that
//! every node in the tree has a unique fully qualified name.

use regex::Regex;
use std::sync::LazyLock;

/// Separator for the name parts.
pub const SEPARATOR: char = '.';

/// Joins a parent name with a simple name. The root has the empty name.
pub fn join(parent: &str, simple: &str) -> String {
    if parent.is_empty() {
        simple.to_string()
    } else {
        format!("{parent}{SEPARATOR}{simple}")
    }
}

/// Separates the first segment of a relative path from the rest.
pub fn split_first(path: &str) -> (&str, Option<&str>) {
    match path.find(SEPARATOR) {
        Some(pos) if pos > 0 => (&path[..pos], Some(&path[pos + 1..])),
        _ => (path, None),
    }
}

static STRIP_CONTAINER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*:[^.]*\.").expect("container prefix pattern"));
static STRIP_ARCHIVE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[jwer]ar:").expect("archive prefix pattern"));
static RESTORE_ARCHIVE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([jwer]ar)").expect("archive suffix pattern"));

/// Returns a human-readable name: the container origin prefix is stripped,
/// encoded archive suffixes are turned back into file suffixes.
///
/// `dir:/opt/app/classes.com.example.Foo` becomes `com.example.Foo`,
/// `jar:slf4j-simple_jar` becomes `slf4j-simple.jar`.
pub fn display_name(name: &str) -> String {
    let stripped = STRIP_CONTAINER.replace_all(name, "");
    let stripped = STRIP_ARCHIVE_PREFIX.replace_all(&stripped, "");
    RESTORE_ARCHIVE_SUFFIX
        .replace_all(&stripped, ".$1")
        .into_owned()
}
