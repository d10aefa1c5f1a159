//! GlobeSort Benchmark Client
//!
//! Measures the latency and throughput of a remote GlobeSort sorting service.
//! A run pings the peer once, submits a batch of random integers for sorting,
//! and derives network-only and application-level throughput from the client's
//! own round-trip timing combined with the processing time reported by the
//! server.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod protocol;
pub mod types;
pub mod values;

// Re-export commonly used types
pub use client::{Connection, ConnectionOptions, SortService, TeardownStatus};
pub use error::{AppError, Result};
pub use executor::{BenchmarkExecutor, BenchmarkReport, LatencyProber, SortBenchmark};
pub use models::{Config, RunMetrics};
pub use output::{ReportEmitter, ReporterFactory};
pub use types::Endpoint;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Largest frame the client accepts from the peer (100 MiB)
    pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;
    /// Smallest accepted override for the inbound message limit
    pub const MIN_MAX_MESSAGE_SIZE: usize = 1024;
    /// Bounded wait for in-flight work to drain on teardown
    pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);
    /// Upper bound accepted for the teardown wait
    pub const MAX_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);
    /// Upper bound accepted for a per-RPC deadline
    pub const MAX_DEADLINE_SECS: u64 = 3600;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
