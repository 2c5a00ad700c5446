//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain reaches the entity store and the
//! pipeline runner; driving ports are the use-cases the inbound adapters
//! invoke. Each trait exposes strongly typed errors so adapters map their
//! failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod branch_commit_command;
mod build_command;
mod lineage_repository;
mod pipeline_runner;

#[cfg(test)]
pub use branch_commit_command::MockBranchCommitCommand;
pub use branch_commit_command::{BranchCommitCommand, BranchCommitEvent};
#[cfg(test)]
pub use build_command::MockBuildCommand;
pub use build_command::{BuildCommand, BuildEvent, LegacyBuildEvent};
#[cfg(test)]
pub use lineage_repository::MockLineageRepository;
pub use lineage_repository::{
    BranchRecord, IterationRecord, LineageRepository, LineageRepositoryError, NewBranch,
};
#[cfg(test)]
pub use pipeline_runner::MockPipelineRunner;
pub use pipeline_runner::{PipelineRunner, RunnerError};
