//! Report emission
//!
//! Reporters receive progress events from the executor as the run advances
//! and the final report once both phases succeed. Unmeasurable throughput is
//! printed as the `-1` sentinel it is, never as zero or infinity.

mod colored;
mod formatter;

pub use colored::ColoredReporter;
pub use formatter::{format_throughput, JsonReporter, PlainReporter};

use crate::{
    error::Result,
    executor::BenchmarkReport,
    models::Config,
    types::Endpoint,
};
use std::io;

/// Sink for benchmark progress and results
pub trait ReportEmitter: Send {
    /// The probe is about to be sent
    fn ping_started(&mut self, endpoint: &Endpoint) -> Result<()>;

    fn ping_completed(&mut self, latency_ms: u64) -> Result<()>;

    /// The sort request is about to be sent
    fn sort_started(&mut self, batch_length: usize) -> Result<()>;

    /// Both phases succeeded
    fn report(&mut self, report: &BenchmarkReport) -> Result<()>;
}

/// Picks the reporter matching the configuration
pub struct ReporterFactory;

impl ReporterFactory {
    /// Reporter writing to stdout
    pub fn create(config: &Config) -> Box<dyn ReportEmitter> {
        Self::create_with_writer(config, io::stdout())
    }

    pub fn create_with_writer<W>(config: &Config, writer: W) -> Box<dyn ReportEmitter>
    where
        W: io::Write + Send + 'static,
    {
        if config.json_output {
            Box::new(JsonReporter::new(writer))
        } else if config.enable_color {
            Box::new(ColoredReporter::new(writer, config.verbose))
        } else {
            Box::new(PlainReporter::new(writer, config.verbose))
        }
    }
}
