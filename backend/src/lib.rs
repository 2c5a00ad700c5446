//! Build-lineage service library.
//!
//! Tracks the delivery hierarchy (service, feature, branch, iteration) fed by
//! source control and build webhooks, derives release configurations by
//! inheritance, and re-triggers pipelines when new images arrive. Laid out
//! hexagonally: `domain` holds the entities, use-cases, and ports; `inbound`
//! and `outbound` hold the adapters.

pub mod api;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::{Trace, TraceId};
