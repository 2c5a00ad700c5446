//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{BranchCommitCommand, BuildCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub branch_commits: Arc<dyn BranchCommitCommand>,
    pub builds: Arc<dyn BuildCommand>,
}

impl HttpState {
    /// Construct state from the two event-handling ports.
    pub fn new(branch_commits: Arc<dyn BranchCommitCommand>, builds: Arc<dyn BuildCommand>) -> Self {
        Self {
            branch_commits,
            builds,
        }
    }
}
