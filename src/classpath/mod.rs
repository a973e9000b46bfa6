//! Classpath enumeration.
//!
//! A classpath string is a list of filesystem paths separated by the host
//! path separator. Each entry is a directory of class files or an archive.
//! The enumerator streams (container, entry path, bytes) triples to a
//! visitor; unreadable entries are reported and skipped, they never abort
//! the pass.

use crate::error::{AnalysisError, Result};
use crate::filter::Filter;
use ignore::WalkBuilder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

const CLASS_SUFFIX: &str = ".class";

/// Archive flavors recognized on the classpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Jar,
    War,
    Ear,
    Rar,
}

impl ArchiveKind {
    /// Determines the kind from a file extension, case-insensitive.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jar" => Some(ArchiveKind::Jar),
            "war" => Some(ArchiveKind::War),
            "ear" => Some(ArchiveKind::Ear),
            "rar" => Some(ArchiveKind::Rar),
            _ => None,
        }
    }

    /// The lowercase suffix, doubling as the container name prefix.
    pub fn suffix(&self) -> &'static str {
        match self {
            ArchiveKind::Jar => "jar",
            ArchiveKind::War => "war",
            ArchiveKind::Ear => "ear",
            ArchiveKind::Rar => "rar",
        }
    }
}

/// One entry of a parsed classpath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClasspathEntry {
    Directory(PathBuf),
    Archive { path: PathBuf, kind: ArchiveKind },
}

impl ClasspathEntry {
    fn classify(path: PathBuf) -> Self {
        let kind = path
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(ArchiveKind::from_extension);
        match kind {
            Some(kind) => ClasspathEntry::Archive { path, kind },
            None => ClasspathEntry::Directory(path),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::Directory(path) => path,
            ClasspathEntry::Archive { path, .. } => path,
        }
    }

    /// The container name under the tree root, per the node naming scheme.
    /// Directories keep their absolute path; archive file names have dots
    /// encoded as underscores so the name stays a single segment.
    pub fn container_name(&self) -> String {
        match self {
            ClasspathEntry::Directory(path) => format!("dir:{}", path.display()),
            ClasspathEntry::Archive { path, kind } => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("{}:{}", kind.suffix(), file_name.replace('.', "_"))
            }
        }
    }
}

/// A class artifact streamed out of a container.
#[derive(Debug)]
pub struct ClassResource {
    /// Container name per the node naming scheme.
    pub container: String,
    /// Absolute path of the containing directory or archive.
    pub container_path: PathBuf,
    /// `/`-separated entry path without the `.class` suffix.
    pub class_path: String,
    pub bytes: Vec<u8>,
}

/// A parsed classpath. Relative entries are resolved against the process
/// working directory at parse time.
#[derive(Debug, Clone, Default)]
pub struct Classpath {
    pub entries: Vec<ClasspathEntry>,
}

impl Classpath {
    /// Splits a classpath string on the host path separator.
    pub fn parse(raw: &str) -> Result<Self> {
        let separator = if cfg!(windows) { ';' } else { ':' };
        let mut entries = Vec::new();
        for part in raw.split(separator).filter(|part| !part.is_empty()) {
            let absolute = std::path::absolute(Path::new(part))?;
            entries.push(ClasspathEntry::classify(absolute));
        }
        Ok(Self { entries })
    }

    /// Resolves the classpath argument form: a `.txt` path with no separator
    /// is read as a file containing the classpath, its stem becoming the
    /// project name. Returns the classpath and the derived name, if any.
    pub fn resolve(argument: &str) -> Result<(Self, Option<String>)> {
        let separator = if cfg!(windows) { ';' } else { ':' };
        if argument.ends_with(".txt") && !argument.contains(separator) {
            let path = Path::new(argument);
            let raw = std::fs::read_to_string(path)?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
            return Ok((Self::parse(raw.trim())?, name));
        }
        Ok((Self::parse(argument)?, None))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Streams every class artifact of every container to the visitor.
    ///
    /// Containers whose name the filter ignores are not opened. A container
    /// that cannot be opened is skipped with a warning and listed in the
    /// returned report; it never aborts the pass. Only a visitor error is
    /// fatal.
    pub fn each_class(
        &self,
        filter: &Filter,
        mut visit: impl FnMut(ClassResource) -> Result<()>,
    ) -> Result<Vec<SkippedContainer>> {
        let mut skipped = Vec::new();
        for entry in &self.entries {
            let container = entry.container_name();
            if filter.is_ignored_source(&container) {
                continue;
            }
            debug!("Scanning {container}");
            let outcome = match entry {
                ClasspathEntry::Directory(path) => scan_directory(path, &container, &mut visit),
                ClasspathEntry::Archive { path, .. } => scan_archive(path, &container, &mut visit),
            };
            if let Err(error) = outcome {
                match error {
                    AnalysisError::UnreadableContainer { .. }
                    | AnalysisError::Io(_)
                    | AnalysisError::Zip(_) => {
                        warn!("Skipping {container}: {error}");
                        skipped.push(SkippedContainer {
                            path: entry.path().to_path_buf(),
                            reason: error.to_string(),
                        });
                    }
                    fatal => return Err(fatal),
                }
            }
        }
        Ok(skipped)
    }
}

/// A container that could not be opened during enumeration.
#[derive(Debug, Clone)]
pub struct SkippedContainer {
    pub path: PathBuf,
    pub reason: String,
}

fn scan_directory(
    directory: &Path,
    container: &str,
    visit: &mut impl FnMut(ClassResource) -> Result<()>,
) -> Result<()> {
    if !directory.is_dir() {
        return Err(AnalysisError::UnreadableContainer {
            path: directory.to_path_buf(),
            reason: "not a readable directory".into(),
        });
    }
    let walker = WalkBuilder::new(directory)
        .hidden(false)
        .git_ignore(false)
        .follow_links(false)
        .build();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!("Unreadable entry under {container}: {error}");
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        let Some(class_path) = class_entry_path(&relative_slash_path(directory, path)) else {
            continue;
        };
        trace!("Found class {class_path} in {container}");
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!("Unreadable class file {}: {error}", path.display());
                continue;
            }
        };
        visit(ClassResource {
            container: container.to_string(),
            container_path: directory.to_path_buf(),
            class_path,
            bytes,
        })?;
    }
    Ok(())
}

fn scan_archive(
    archive_path: &Path,
    container: &str,
    visit: &mut impl FnMut(ClassResource) -> Result<()>,
) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(error) => {
                warn!("Unreadable archive entry in {container}: {error}");
                continue;
            }
        };
        if !entry.is_file() {
            continue;
        }
        let Some(class_path) = class_entry_path(entry.name()) else {
            continue;
        };
        trace!("Found class {class_path} in {container}");
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        if let Err(error) = entry.read_to_end(&mut bytes) {
            warn!("Unreadable archive entry {class_path} in {container}: {error}");
            continue;
        }
        visit(ClassResource {
            container: container.to_string(),
            container_path: archive_path.to_path_buf(),
            class_path,
            bytes,
        })?;
    }
    Ok(())
}

fn relative_slash_path(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn class_entry_path(entry_name: &str) -> Option<String> {
    entry_name
        .strip_suffix(CLASS_SUFFIX)
        .map(|stem| stem.to_string())
}
