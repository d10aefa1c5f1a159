//! Plain text and JSON reporters

use super::ReportEmitter;
use crate::{
    error::Result,
    executor::BenchmarkReport,
    models::metrics::{is_measured, RunMetrics, UNMEASURABLE},
    types::Endpoint,
};
use std::io::Write;

/// Render a throughput figure, keeping the sentinel verbatim
pub fn format_throughput(value: f64) -> String {
    if is_measured(value) {
        format!("{:.2}", value)
    } else {
        format!("{}", UNMEASURABLE)
    }
}

/// Breakdown lines shared by the text reporters in verbose mode
pub(crate) fn timing_breakdown(metrics: &RunMetrics) -> Vec<String> {
    vec![
        format!("  Values sorted:       {}", metrics.batch_length),
        format!("  Payload:             {} bytes", metrics.payload_bytes()),
        format!("  Round trip:          {}ms", metrics.total_ms),
        format!("  Server processing:   {}ms ({}ns)", metrics.server_processing_ms(), metrics.server_processing_ns),
        format!("  Network (two-way):   {}ms", metrics.two_way_network_ms),
    ]
}

/// Uncolored, line-oriented reporter
pub struct PlainReporter<W: Write + Send> {
    writer: W,
    verbose: bool,
}

impl<W: Write + Send> PlainReporter<W> {
    pub fn new(writer: W, verbose: bool) -> Self {
        Self { writer, verbose }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ReportEmitter for PlainReporter<W> {
    fn ping_started(&mut self, endpoint: &Endpoint) -> Result<()> {
        writeln!(self.writer, "Pinging {}...", endpoint)?;
        Ok(())
    }

    fn ping_completed(&mut self, latency_ms: u64) -> Result<()> {
        writeln!(self.writer, "Ping successful: {}ms", latency_ms)?;
        Ok(())
    }

    fn sort_started(&mut self, batch_length: usize) -> Result<()> {
        if self.verbose {
            writeln!(self.writer, "Requesting server to sort array of {} values", batch_length)?;
        } else {
            writeln!(self.writer, "Requesting server to sort array")?;
        }
        Ok(())
    }

    fn report(&mut self, report: &BenchmarkReport) -> Result<()> {
        let metrics = &report.metrics;
        if self.verbose {
            for line in timing_breakdown(metrics) {
                writeln!(self.writer, "{}", line)?;
            }
        }
        writeln!(self.writer, "Application throughput: {} ints/sec", format_throughput(metrics.application_throughput))?;
        writeln!(self.writer, "One-way throughput: {} bytes/sec", format_throughput(metrics.one_way_throughput))?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Emits one JSON document with the full report; progress events are silent
pub struct JsonReporter<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ReportEmitter for JsonReporter<W> {
    fn ping_started(&mut self, _endpoint: &Endpoint) -> Result<()> {
        Ok(())
    }

    fn ping_completed(&mut self, _latency_ms: u64) -> Result<()> {
        Ok(())
    }

    fn sort_started(&mut self, _batch_length: usize) -> Result<()> {
        Ok(())
    }

    fn report(&mut self, report: &BenchmarkReport) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, report)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn sample_report(total: Duration, server_ns: i64) -> BenchmarkReport {
        BenchmarkReport {
            endpoint: "10.0.0.1:50051".to_string(),
            started_at: Utc::now(),
            metrics: RunMetrics::compute(1000, total, server_ns).with_ping_latency(2),
        }
    }

    fn run_plain(report: &BenchmarkReport, verbose: bool) -> String {
        let mut reporter = PlainReporter::new(Vec::new(), verbose);
        let endpoint = Endpoint::new("10.0.0.1", 50051).unwrap();
        reporter.ping_started(&endpoint).unwrap();
        reporter.ping_completed(2).unwrap();
        reporter.sort_started(1000).unwrap();
        reporter.report(report).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_format_throughput() {
        assert_eq!(format_throughput(10_000.0), "10000.00");
        assert_eq!(format_throughput(UNMEASURABLE), "-1");
    }

    #[test]
    fn test_plain_report_lines() {
        let output = run_plain(&sample_report(Duration::from_millis(100), 40), false);
        assert_eq!(
            output,
            "Pinging 10.0.0.1:50051...\n\
             Ping successful: 2ms\n\
             Requesting server to sort array\n\
             Application throughput: 10000.00 ints/sec\n\
             One-way throughput: 80808.08 bytes/sec\n\n"
        );
    }

    #[test]
    fn test_plain_report_keeps_sentinel() {
        let output = run_plain(&sample_report(Duration::from_micros(400), 0), false);
        assert!(output.contains("Application throughput: -1 ints/sec"));
        assert!(output.contains("One-way throughput: -1 bytes/sec"));
    }

    #[test]
    fn test_verbose_breakdown() {
        let output = run_plain(&sample_report(Duration::from_millis(100), 25_000_000), true);
        assert!(output.contains("Requesting server to sort array of 1000 values"));
        assert!(output.contains("Server processing:   25ms (25000000ns)"));
        assert!(output.contains("Network (two-way):   75ms"));
    }

    #[test]
    fn test_json_report_is_single_document() {
        let report = sample_report(Duration::from_micros(400), 0);
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.ping_completed(2).unwrap();
        reporter.report(&report).unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["endpoint"], "10.0.0.1:50051");
        assert_eq!(value["metrics"]["application_throughput"], serde_json::json!(-1.0));
        assert_eq!(value["metrics"]["ping_ms"], serde_json::json!(2));
    }
}
