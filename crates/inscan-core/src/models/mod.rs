//! Data models: metrics, configuration and stat records.

pub mod config;
pub mod metrics;
pub mod record;
