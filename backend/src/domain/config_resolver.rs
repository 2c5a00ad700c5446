//! Configuration-inheritance resolver.
//!
//! Given a branch (and transitively its merge-base lineage), decide which
//! configuration a new iteration on that branch should be released with:
//!
//! 1. the most recent release on the same branch, excluding the iteration
//!    being processed;
//! 2. else the most recent release attached to any iteration sharing the
//!    branch's merge-base commit on a branch of the same service;
//! 3. else the empty configuration, idempotently created on demand.
//!
//! "Most recent" is the release with the greatest creation order. Absence of
//! an ancestor is a normal branch of logic; only storage errors propagate.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{BranchRecord, LineageRepository, LineageRepositoryError};
use crate::domain::{ConfigId, ConfigPairs, IterationId};

/// Resolver over the lineage store's release history.
#[derive(Clone)]
pub struct ConfigResolver<R> {
    repo: Arc<R>,
}

impl<R> ConfigResolver<R> {
    /// Create a resolver over the given store.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R: LineageRepository> ConfigResolver<R> {
    /// Resolve the configuration a new iteration on `branch` inherits.
    ///
    /// The resolver reads a snapshot of release history; a race between two
    /// builds on the same branch may nondeterministically pick either as
    /// "most recent", which is accepted.
    pub async fn resolve(
        &self,
        branch: &BranchRecord,
        current_iteration: IterationId,
    ) -> Result<ConfigId, LineageRepositoryError> {
        if let Some(config_id) = self
            .repo
            .latest_branch_release_config(branch.id, current_iteration)
            .await?
        {
            debug!(branch_id = %branch.id, %config_id, "inherited branch-local config");
            return Ok(config_id);
        }

        if let Some(merge_base) = branch.merge_base_commit_hash.as_deref() {
            if let Some(config_id) = self
                .repo
                .latest_merge_base_release_config(branch.service_id, merge_base)
                .await?
            {
                debug!(branch_id = %branch.id, merge_base, %config_id, "inherited merge-base config");
                return Ok(config_id);
            }
        }

        debug!(branch_id = %branch.id, "no ancestry found, falling back to the empty config");
        self.repo.idem_config(&ConfigPairs::empty()).await
    }
}

#[cfg(test)]
#[path = "config_resolver_tests.rs"]
mod tests;
