//! Port abstraction for the external pipeline runner.
//!
//! The runner executes a pipeline action for a release. The orchestrator
//! treats it as fire-and-report: a failed notification is logged, never
//! retried inline, and never rolls back persisted state.

use async_trait::async_trait;

use crate::domain::ReleaseId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by runner adapters.
    pub enum RunnerError {
        /// The request could not be delivered (connect failure or timeout).
        Transport { message: String } => "pipeline runner request failed: {message}",
        /// The runner answered with a non-success status.
        Status { status: u16 } => "pipeline runner rejected the update: http status {status}",
    }
}

/// Port for notifying the runner that a release must be re-run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PipelineRunner: Send + Sync {
    /// Ask the runner to apply the `UPDATE` action to a release.
    async fn update_release(&self, release_id: ReleaseId) -> Result<(), RunnerError>;
}
