use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the analysis engine.
///
/// Every failure the engine can observe is an enumerated kind with a
/// human-readable message; nothing escapes as an opaque panic.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Bytes do not form a readable class file. The scanner logs and skips
    /// the artifact.
    #[error("bad class file{}: {reason}", context_suffix(.context))]
    BadClassFile {
        reason: String,
        /// Entry path inside the container, if known.
        context: Option<String>,
    },

    /// A classpath container could not be opened.
    #[error("cannot open container {path}: {reason}")]
    UnreadableContainer { path: PathBuf, reason: String },

    /// The root node cannot be collapsed; there would be nothing left to show.
    #[error("cannot collapse the root node")]
    InvalidCollapse,

    /// Edge density is undefined on graphs with fewer than two nodes.
    #[error("edge density is undefined for a graph with {nodes} node(s)")]
    EmptyGraphDensity { nodes: usize },

    /// Cooperative cancellation was observed during a long computation.
    #[error("analysis cancelled")]
    Cancelled,

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn bad_class_file(reason: impl Into<String>) -> Self {
        AnalysisError::BadClassFile {
            reason: reason.into(),
            context: None,
        }
    }

    pub fn with_context(self, entry: impl Into<String>) -> Self {
        match self {
            AnalysisError::BadClassFile { reason, .. } => AnalysisError::BadClassFile {
                reason,
                context: Some(entry.into()),
            },
            other => other,
        }
    }

    /// Exit code communicated by the command line layer.
    pub fn exit_code(&self) -> i32 {
        match self {
            AnalysisError::UnreadableContainer { .. } => 3,
            AnalysisError::Cancelled => 4,
            _ => 1,
        }
    }
}

fn context_suffix(context: &Option<String>) -> String {
    context
        .as_deref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
