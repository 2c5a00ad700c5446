//! Idempotent hierarchy factories.
//!
//! Thin applications of the entity store's idempotent save, one per level of
//! the service -> feature -> branch -> iteration hierarchy. Composing all
//! four for a single branch-commit event is idempotent as a whole: replaying
//! an identical event yields the same four identifiers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    BranchCommitCommand, BranchCommitEvent, BranchRecord, LineageRepository, NewBranch,
};
use crate::domain::{BranchId, Error, FeatureId, IterationId, ServiceId};

/// Hierarchy factory service backed by the lineage store.
#[derive(Clone)]
pub struct HierarchyService<R> {
    repo: Arc<R>,
}

impl<R> HierarchyService<R> {
    /// Create a new service over the given store.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R: LineageRepository> HierarchyService<R> {
    /// Idempotently represent a repository as a service.
    pub async fn idem_service(&self, repo_name: &str) -> Result<ServiceId, Error> {
        Ok(self.repo.idem_service(repo_name).await?)
    }

    /// Idempotently represent a feature owned by a service.
    pub async fn idem_feature(
        &self,
        feature_name: &str,
        service_id: ServiceId,
    ) -> Result<FeatureId, Error> {
        Ok(self.repo.idem_feature(feature_name, service_id).await?)
    }

    /// Idempotently represent a branch under a feature or service.
    ///
    /// The merge base must be supplied the first time a branch is observed
    /// with one; it is immutable thereafter.
    pub async fn idem_branch(&self, branch: &NewBranch) -> Result<BranchRecord, Error> {
        Ok(self.repo.idem_branch(branch).await?)
    }

    /// Idempotently represent a commit on a branch as an iteration.
    pub async fn idem_iteration(
        &self,
        commit_hash: &str,
        branch_id: BranchId,
    ) -> Result<IterationId, Error> {
        Ok(self.repo.idem_iteration(commit_hash, branch_id, None).await?)
    }
}

#[async_trait]
impl<R> BranchCommitCommand for HierarchyService<R>
where
    R: LineageRepository + 'static,
{
    async fn handle_branch_commit(
        &self,
        event: &BranchCommitEvent,
    ) -> Result<IterationId, Error> {
        info!(
            repo = %event.repo_name,
            feature = %event.feature_name,
            branch = %event.branch_name,
            commit = %event.commit_hash,
            "handling branch commit"
        );

        let service_id = self.idem_service(&event.repo_name).await?;
        let feature_id = self.idem_feature(&event.feature_name, service_id).await?;
        let branch = self
            .idem_branch(&NewBranch {
                name: event.branch_name.clone(),
                merge_base_commit_hash: None,
                service_id,
                feature_id: Some(feature_id),
            })
            .await?;
        self.idem_iteration(&event.commit_hash, branch.id).await
    }
}

#[cfg(test)]
#[path = "hierarchy_tests.rs"]
mod tests;
