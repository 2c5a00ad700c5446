//! Domain primitives and services for build-lineage tracking.
//!
//! The domain owns the entity identifiers, the configuration value object,
//! the idempotent hierarchy factories, the configuration-inheritance
//! resolver, and the build orchestrator. Everything here is transport and
//! storage agnostic: persistence and the pipeline runner are reached through
//! the traits in [`ports`].

pub mod build_service;
pub mod config_pairs;
pub mod config_resolver;
pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod ports;
pub mod text;

pub use self::build_service::BuildService;
pub use self::config_pairs::ConfigPairs;
pub use self::config_resolver::ConfigResolver;
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::hierarchy::HierarchyService;
pub use self::ids::{BranchId, ConfigId, FeatureId, IterationId, PipelineId, ReleaseId, ServiceId};
pub use self::text::truncate_at_nul;
