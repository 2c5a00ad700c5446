//! HTTP inbound adapter exposing the webhook endpoints.

pub mod error;
pub mod events;
pub mod state;

pub use error::ApiResult;
