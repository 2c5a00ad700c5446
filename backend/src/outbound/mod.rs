//! Outbound adapters: implementations of domain ports against external
//! systems (PostgreSQL persistence, the pipeline runner HTTP API).

pub mod persistence;
pub mod runner;
