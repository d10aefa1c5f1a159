//! Colored terminal reporter

use super::formatter::{format_throughput, timing_breakdown};
use super::ReportEmitter;
use crate::{
    error::Result,
    executor::BenchmarkReport,
    models::metrics::is_measured,
    types::Endpoint,
};
use colored::*;
use std::io::Write;

/// Latency classification for color coding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatencyLevel {
    Excellent,  // < 1ms
    Good,       // 1-10ms
    Fair,       // 10-100ms
    Poor,       // >= 100ms
}

impl LatencyLevel {
    pub fn from_ms(latency_ms: u64) -> Self {
        match latency_ms {
            0 => Self::Excellent,
            1..=9 => Self::Good,
            10..=99 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Red,
        }
    }
}

/// Reporter that colors figures by quality and flags unmeasurable values
pub struct ColoredReporter<W: Write + Send> {
    writer: W,
    verbose: bool,
}

impl<W: Write + Send> ColoredReporter<W> {
    pub fn new(writer: W, verbose: bool) -> Self {
        Self { writer, verbose }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn throughput(value: f64) -> ColoredString {
        let text = format_throughput(value);
        if is_measured(value) {
            text.as_str().green().bold()
        } else {
            text.as_str().yellow().bold()
        }
    }
}

impl<W: Write + Send> ReportEmitter for ColoredReporter<W> {
    fn ping_started(&mut self, endpoint: &Endpoint) -> Result<()> {
        writeln!(self.writer, "{} {}...", "Pinging".bold(), endpoint.to_string().as_str().cyan())?;
        Ok(())
    }

    fn ping_completed(&mut self, latency_ms: u64) -> Result<()> {
        let level = LatencyLevel::from_ms(latency_ms);
        writeln!(
            self.writer,
            "{} {}",
            "Ping successful:".green(),
            format!("{}ms", latency_ms).as_str().color(level.color()).bold()
        )?;
        Ok(())
    }

    fn sort_started(&mut self, batch_length: usize) -> Result<()> {
        if self.verbose {
            writeln!(self.writer, "{}", format!("Requesting server to sort array of {} values", batch_length).as_str().bold())?;
        } else {
            writeln!(self.writer, "{}", "Requesting server to sort array".bold())?;
        }
        Ok(())
    }

    fn report(&mut self, report: &BenchmarkReport) -> Result<()> {
        let metrics = &report.metrics;
        if self.verbose {
            for line in timing_breakdown(metrics) {
                writeln!(self.writer, "{}", line.as_str().dimmed())?;
            }
        }

        writeln!(
            self.writer,
            "Application throughput: {} ints/sec",
            Self::throughput(metrics.application_throughput)
        )?;
        writeln!(
            self.writer,
            "One-way throughput: {} bytes/sec",
            Self::throughput(metrics.one_way_throughput)
        )?;

        if !metrics.application_measured() || !metrics.one_way_measured() {
            writeln!(
                self.writer,
                "{}",
                "Note: -1 means the figure could not be measured (round trip or network time rounded to 0 ms)".yellow()
            )?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
