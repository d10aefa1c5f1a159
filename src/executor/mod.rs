//! Benchmark execution
//!
//! A run is a strict two-phase procedure over one connection: an empty
//! latency probe, then the bulk sort request. Nothing is retried and the
//! second phase never starts if the first one fails.

use crate::{
    client::SortService,
    error::{AppError, Result},
    logging::Logger,
    models::metrics::{duration_to_ms, RunMetrics},
    output::ReportEmitter,
    types::Endpoint,
    values::IntegerBatch,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Everything reported for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// `host:port` of the peer
    pub endpoint: String,
    /// Wall-clock time the run started
    pub started_at: DateTime<Utc>,
    pub metrics: RunMetrics,
}

/// Measures the round trip of an empty request
pub struct LatencyProber {
    logger: Logger,
}

impl LatencyProber {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Whole milliseconds from just before the send to just after the reply
    pub async fn ping<S: SortService + ?Sized>(&self, service: &mut S) -> Result<u64> {
        let start = Instant::now();
        service.ping().await?;
        let latency_ms = duration_to_ms(start.elapsed());

        self.logger.debug("Ping round trip complete")
            .field("latency_ms", latency_ms)
            .log()
            .await;

        Ok(latency_ms)
    }
}

/// Times a single sort request and derives throughput from it
pub struct SortBenchmark {
    logger: Logger,
    verify_order: bool,
}

impl SortBenchmark {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            verify_order: false,
        }
    }

    /// Also check that the returned sequence is in non-decreasing order
    pub fn with_order_verification(mut self, verify_order: bool) -> Self {
        self.verify_order = verify_order;
        self
    }

    /// Send the whole batch, time the round trip and compute run metrics.
    ///
    /// Transport failures propagate unchanged; no partial metrics are produced.
    pub async fn run<S: SortService + ?Sized>(&self, service: &mut S, batch: &IntegerBatch) -> Result<RunMetrics> {
        let start = Instant::now();
        let outcome = service.sort_integers(batch.as_slice()).await?;
        let total = start.elapsed();

        if outcome.values.len() != batch.len() {
            return Err(AppError::protocol(format!(
                "Server returned {} values for a batch of {}",
                outcome.values.len(),
                batch.len()
            )));
        }

        if self.verify_order {
            let sorted = outcome.values.windows(2).all(|w| w[0] <= w[1]);
            if sorted {
                crate::log_debug!(self.logger, "Server response is in ascending order");
            } else {
                self.logger.warn("Server response is not in ascending order")
                    .field("batch_length", batch.len())
                    .log()
                    .await;
            }
        }

        let metrics = RunMetrics::compute(batch.len(), total, outcome.nano_seconds);

        self.logger.info("Sort request complete")
            .metrics(&metrics)
            .log()
            .await;

        Ok(metrics)
    }
}

/// Runs the probe and the sort benchmark in order, reporting as it goes
pub struct BenchmarkExecutor {
    prober: LatencyProber,
    sorter: SortBenchmark,
    logger: Logger,
}

impl BenchmarkExecutor {
    pub fn new(logger: Logger) -> Self {
        Self {
            prober: LatencyProber::new(logger.named("PING")),
            sorter: SortBenchmark::new(logger.named("SORT")),
            logger,
        }
    }

    pub fn with_order_verification(mut self, verify_order: bool) -> Self {
        self.sorter = self.sorter.with_order_verification(verify_order);
        self
    }

    /// Ping, then sort. The sort request is never issued if the ping fails.
    pub async fn execute<S: SortService + ?Sized>(
        &self,
        service: &mut S,
        endpoint: &Endpoint,
        batch: &IntegerBatch,
        emitter: &mut dyn ReportEmitter,
    ) -> Result<BenchmarkReport> {
        let started_at = Utc::now();
        let correlation_id = self.logger.start_operation("benchmark").await;

        let result = self.run_phases(service, endpoint, batch, emitter).await;

        self.logger.end_operation(&correlation_id, "benchmark", result.is_ok()).await;
        let metrics = result?;

        let report = BenchmarkReport {
            endpoint: endpoint.to_string(),
            started_at,
            metrics,
        };
        emitter.report(&report)?;
        Ok(report)
    }

    async fn run_phases<S: SortService + ?Sized>(
        &self,
        service: &mut S,
        endpoint: &Endpoint,
        batch: &IntegerBatch,
        emitter: &mut dyn ReportEmitter,
    ) -> Result<RunMetrics> {
        emitter.ping_started(endpoint)?;
        let ping_ms = self.prober.ping(service).await?;
        emitter.ping_completed(ping_ms)?;

        emitter.sort_started(batch.len())?;
        let metrics = self.sorter.run(service, batch).await?;
        Ok(metrics.with_ping_latency(ping_ms))
    }
}
