//! Driving port for build webhook events.

use async_trait::async_trait;

use crate::domain::{Error, IterationId};

/// A build event carrying the full hierarchy context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEvent {
    pub service_name: String,
    pub branch_name: String,
    pub merge_base_commit_hash: String,
    pub commit_hash: String,
    pub image_name: String,
}

/// A legacy build event identifying the iteration by commit hash alone.
///
/// The iteration must already exist; the handler fails with `NotFound` for a
/// commit that was never seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyBuildEvent {
    pub commit_hash: String,
    pub image_name: String,
}

/// Port for recording a build and fanning out release updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildCommand: Send + Sync {
    /// Handle a full build event: materialize the hierarchy on demand,
    /// record the built image, create releases, and notify the runner.
    async fn handle_build(&self, event: &BuildEvent) -> Result<IterationId, Error>;

    /// Handle a legacy build event against an already known iteration.
    async fn handle_legacy_build(&self, event: &LegacyBuildEvent)
    -> Result<IterationId, Error>;
}
