//! Port abstraction for the lineage entity store.
//!
//! The store provides one primitive: the idempotent save (insert-or-fetch by
//! uniqueness key, first writer wins on non-key columns), plus the read
//! queries the configuration resolver and the build orchestrator need.
//! Uniqueness races are resolved inside the adapter and never surface as
//! errors; only genuine storage failures propagate.

use async_trait::async_trait;

use crate::domain::{
    BranchId, ConfigId, ConfigPairs, FeatureId, IterationId, PipelineId, ReleaseId, ServiceId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by lineage store adapters.
    pub enum LineageRepositoryError {
        /// The backing store cannot be reached; transient, safe to retry.
        Connection { message: String } => "lineage store connection failed: {message}",
        /// A non-uniqueness column constraint was violated; the data is invalid.
        Constraint { message: String } => "lineage store constraint violated: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "lineage store query failed: {message}",
    }
}

/// A branch row as the domain sees it.
///
/// `merge_base_commit_hash` anchors inheritance lookups and is immutable once
/// the row exists; it is `None` for branches first observed through a
/// branch-commit event, which carries no merge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRecord {
    pub id: BranchId,
    pub service_id: ServiceId,
    pub feature_id: Option<FeatureId>,
    pub merge_base_commit_hash: Option<String>,
}

/// An iteration row as the domain sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationRecord {
    pub id: IterationId,
    pub branch_id: BranchId,
    pub image_name: Option<String>,
}

/// Natural key and parent links for an idempotent branch save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBranch {
    pub name: String,
    pub merge_base_commit_hash: Option<String>,
    pub service_id: ServiceId,
    pub feature_id: Option<FeatureId>,
}

/// Port for the idempotent entity store and its lineage queries.
///
/// Every save is an insert-or-fetch on the entity's uniqueness key: repeated
/// calls with the same key return the same identifier and leave non-key
/// columns untouched. String values are truncated at the first NUL byte
/// before comparison or storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LineageRepository: Send + Sync {
    /// Idempotently save a service by name.
    async fn idem_service(&self, name: &str) -> Result<ServiceId, LineageRepositoryError>;

    /// Idempotently save a feature by (name, service).
    async fn idem_feature(
        &self,
        name: &str,
        service_id: ServiceId,
    ) -> Result<FeatureId, LineageRepositoryError>;

    /// Idempotently save a branch by (name, merge base, live).
    ///
    /// Returns the full record so callers can reuse the stored merge base and
    /// parent links without a second lookup; on a repeat save the stored
    /// values win over the ones supplied.
    async fn idem_branch(
        &self,
        branch: &NewBranch,
    ) -> Result<BranchRecord, LineageRepositoryError>;

    /// Idempotently save an iteration by (commit, branch).
    ///
    /// `image_name` is only written when the row is created; a repeat save
    /// never overwrites a previously stored image name.
    async fn idem_iteration<'a>(
        &self,
        commit_hash: &str,
        branch_id: BranchId,
        image_name: Option<&'a str>,
    ) -> Result<IterationId, LineageRepositoryError>;

    /// Idempotently save a configuration by its serialized form.
    async fn idem_config(
        &self,
        pairs: &ConfigPairs,
    ) -> Result<ConfigId, LineageRepositoryError>;

    /// Idempotently save a release binding (iteration, config, pipeline).
    async fn idem_release(
        &self,
        iteration_id: IterationId,
        config_id: ConfigId,
        pipeline_id: Option<PipelineId>,
    ) -> Result<ReleaseId, LineageRepositoryError>;

    /// Overwrite an iteration's image name.
    ///
    /// This is the explicit build-update path, the only place an existing
    /// image name may change.
    async fn set_iteration_image(
        &self,
        iteration_id: IterationId,
        image_name: &str,
    ) -> Result<(), LineageRepositoryError>;

    /// Find the most recently created iteration for a commit hash, if any.
    async fn find_iteration_by_commit(
        &self,
        commit_hash: &str,
    ) -> Result<Option<IterationRecord>, LineageRepositoryError>;

    /// Fetch a branch record by identifier.
    async fn find_branch(
        &self,
        branch_id: BranchId,
    ) -> Result<Option<BranchRecord>, LineageRepositoryError>;

    /// Config of the most recent release on this branch, excluding the
    /// iteration currently being processed.
    async fn latest_branch_release_config(
        &self,
        branch_id: BranchId,
        exclude_iteration: IterationId,
    ) -> Result<Option<ConfigId>, LineageRepositoryError>;

    /// Config of the most recent release attached to any iteration sharing
    /// `commit_hash` on a branch of the given service.
    async fn latest_merge_base_release_config(
        &self,
        service_id: ServiceId,
        commit_hash: &str,
    ) -> Result<Option<ConfigId>, LineageRepositoryError>;

    /// Automatic pipelines configured for a branch or its owning feature.
    async fn automatic_pipelines(
        &self,
        branch_id: BranchId,
        feature_id: Option<FeatureId>,
    ) -> Result<Vec<PipelineId>, LineageRepositoryError>;
}
