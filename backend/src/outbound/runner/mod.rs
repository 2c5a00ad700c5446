//! HTTP adapter for the external pipeline runner.

mod http_runner;

pub use http_runner::HttpPipelineRunner;
