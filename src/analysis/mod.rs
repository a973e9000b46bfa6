//! Graph algorithms and project-level checks on top of the snapshot.

mod checker;
mod closure;
mod cycles;
mod reachability;

pub use checker::{ReferenceChecker, UnreferencedReport};
pub use closure::{edge_density, transitive_closure, transitive_density};
pub use cycles::CycleFinder;
pub use reachability::{implied_by, reachable_from};

use crate::error::{AnalysisError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal for long computations.
///
/// The engine has no built-in timeout; callers impose deadlines by setting
/// the token from outside. The algorithms check it at each outer iteration
/// and fail with [`AnalysisError::Cancelled`] without leaving partial
/// results.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Fails with `Cancelled` once the flag is set.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }
}
