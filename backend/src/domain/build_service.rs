//! Build orchestrator.
//!
//! On a build event: record the built image against the iteration, resolve
//! the inherited configuration, create release rows, and notify the external
//! runner for every affected release. Runner failures are reported through
//! logs and never roll back persisted state.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::config_resolver::ConfigResolver;
use crate::domain::ports::{
    BranchRecord, BuildCommand, BuildEvent, LegacyBuildEvent, LineageRepository, NewBranch,
    PipelineRunner,
};
use crate::domain::{Error, IterationId, ReleaseId};

/// Build orchestrator over the lineage store and the pipeline runner.
#[derive(Clone)]
pub struct BuildService<R, N> {
    repo: Arc<R>,
    resolver: ConfigResolver<R>,
    runner: Arc<N>,
}

impl<R, N> BuildService<R, N> {
    /// Create an orchestrator over the given store and runner.
    pub fn new(repo: Arc<R>, runner: Arc<N>) -> Self {
        let resolver = ConfigResolver::new(Arc::clone(&repo));
        Self {
            repo,
            resolver,
            runner,
        }
    }
}

impl<R, N> BuildService<R, N>
where
    R: LineageRepository,
    N: PipelineRunner,
{
    /// Resolve the inherited config, idempotently create the branch-default
    /// release plus one release per automatic pipeline, and notify the
    /// runner for each affected release.
    async fn release_and_notify(
        &self,
        branch: &BranchRecord,
        iteration_id: IterationId,
    ) -> Result<(), Error> {
        let config_id = self.resolver.resolve(branch, iteration_id).await?;

        let mut affected: Vec<ReleaseId> = Vec::new();
        affected.push(self.repo.idem_release(iteration_id, config_id, None).await?);

        let pipelines = self
            .repo
            .automatic_pipelines(branch.id, branch.feature_id)
            .await?;
        for pipeline_id in pipelines {
            affected.push(
                self.repo
                    .idem_release(iteration_id, config_id, Some(pipeline_id))
                    .await?,
            );
        }

        info!(%iteration_id, %config_id, releases = affected.len(), "running releases");
        for release_id in affected {
            if let Err(error) = self.runner.update_release(release_id).await {
                // State is already durable; failed notifications are surfaced
                // through observability, not through the response.
                warn!(%error, %release_id, "pipeline runner notification failed");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl<R, N> BuildCommand for BuildService<R, N>
where
    R: LineageRepository + 'static,
    N: PipelineRunner + 'static,
{
    async fn handle_build(&self, event: &BuildEvent) -> Result<IterationId, Error> {
        info!(
            service = %event.service_name,
            branch = %event.branch_name,
            merge_base = %event.merge_base_commit_hash,
            commit = %event.commit_hash,
            image = %event.image_name,
            "handling build"
        );

        let service_id = self.repo.idem_service(&event.service_name).await?;
        let branch = self
            .repo
            .idem_branch(&NewBranch {
                name: event.branch_name.clone(),
                merge_base_commit_hash: Some(event.merge_base_commit_hash.clone()),
                service_id,
                feature_id: None,
            })
            .await?;
        let iteration_id = self
            .repo
            .idem_iteration(&event.commit_hash, branch.id, Some(&event.image_name))
            .await?;

        // The explicit build update is the one place an existing image name
        // may change.
        self.repo
            .set_iteration_image(iteration_id, &event.image_name)
            .await?;

        self.release_and_notify(&branch, iteration_id).await?;
        Ok(iteration_id)
    }

    async fn handle_legacy_build(
        &self,
        event: &LegacyBuildEvent,
    ) -> Result<IterationId, Error> {
        info!(commit = %event.commit_hash, image = %event.image_name, "handling legacy build");

        let iteration = self
            .repo
            .find_iteration_by_commit(&event.commit_hash)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "no iteration recorded for commit {}",
                    event.commit_hash
                ))
            })?;

        self.repo
            .set_iteration_image(iteration.id, &event.image_name)
            .await?;

        let branch = self
            .repo
            .find_branch(iteration.branch_id)
            .await?
            .ok_or_else(|| Error::internal("iteration references a missing branch"))?;

        self.release_and_notify(&branch, iteration.id).await?;
        Ok(iteration.id)
    }
}

#[cfg(test)]
#[path = "build_service_tests.rs"]
mod tests;
