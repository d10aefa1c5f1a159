//! Data models for the benchmark client

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use metrics::{RunMetrics, UNMEASURABLE};
