//! Process-level HTTP surface that is not part of the domain API.

pub mod health;
