//! Driving port for branch-commit webhook events.

use async_trait::async_trait;

use crate::domain::{Error, IterationId};

/// A branch-commit event as delivered by source control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCommitEvent {
    pub repo_name: String,
    pub feature_name: String,
    pub branch_name: String,
    pub commit_hash: String,
}

/// Port for materializing the hierarchy from a branch-commit event.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BranchCommitCommand: Send + Sync {
    /// Idempotently materialize service, feature, branch, and iteration rows
    /// and return the iteration identifier. Replaying an identical event
    /// yields the same identifier.
    async fn handle_branch_commit(
        &self,
        event: &BranchCommitEvent,
    ) -> Result<IterationId, Error>;
}
