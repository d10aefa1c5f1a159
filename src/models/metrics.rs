//! Run metrics and the timing arithmetic behind them
//!
//! All millisecond figures are whole milliseconds, truncated toward zero.
//! Throughput figures that cannot be measured because the elapsed time
//! truncates to zero are reported as [`UNMEASURABLE`] rather than as zero or
//! infinity.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sentinel reported instead of a throughput when the elapsed time is too
/// small to measure
pub const UNMEASURABLE: f64 = -1.0;

/// Wire size of one batch element
pub const BYTES_PER_INT: u64 = 4;

const NANOS_PER_MILLI: u128 = 1_000_000;

/// Convert nanoseconds to whole milliseconds, truncating
pub fn nanos_to_ms(nanos: u128) -> u64 {
    u64::try_from(nanos / NANOS_PER_MILLI).unwrap_or(u64::MAX)
}

/// Convert a duration to whole milliseconds, truncating
pub fn duration_to_ms(duration: Duration) -> u64 {
    nanos_to_ms(duration.as_nanos())
}

/// Round trip minus the server's reported processing time, in whole ms.
///
/// A negative server duration counts as zero. If the server reports more time
/// than the client measured, the result saturates at zero.
pub fn two_way_network_ms(total: Duration, server_processing_ns: i64) -> u64 {
    let server_ns = u128::try_from(server_processing_ns).unwrap_or(0);
    nanos_to_ms(total.as_nanos().saturating_sub(server_ns))
}

/// Bytes per second for one direction of travel, taking half the two-way
/// network time as the one-way transit time
pub fn one_way_throughput(batch_length: usize, two_way_network_ms: u64) -> f64 {
    if two_way_network_ms == 0 {
        return UNMEASURABLE;
    }
    let bytes = batch_length as f64 * BYTES_PER_INT as f64;
    bytes / (two_way_network_ms as f64 / 2.0 / 1000.0)
}

/// Elements per second over the full round trip
pub fn application_throughput(batch_length: usize, total_ms: u64) -> f64 {
    if total_ms == 0 {
        return UNMEASURABLE;
    }
    batch_length as f64 / (total_ms as f64 / 1000.0)
}

/// Whether a throughput figure is a real measurement
pub fn is_measured(throughput: f64) -> bool {
    throughput != UNMEASURABLE
}

/// Metrics derived from a single benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Number of integers sent for sorting
    pub batch_length: usize,

    /// Latency of the empty probe, when one was taken
    pub ping_ms: Option<u64>,

    /// Full round trip of the sort request
    pub total_ms: u64,

    /// Processing time reported by the server
    pub server_processing_ns: i64,

    /// Round trip minus server processing time
    pub two_way_network_ms: u64,

    /// Bytes per second, one direction
    pub one_way_throughput: f64,

    /// Elements per second, end to end
    pub application_throughput: f64,
}

impl RunMetrics {
    /// Derive every figure from the client-side round trip and the
    /// server-reported processing time
    pub fn compute(batch_length: usize, total: Duration, server_processing_ns: i64) -> Self {
        let two_way_network_ms = two_way_network_ms(total, server_processing_ns);
        let total_ms = duration_to_ms(total);

        Self {
            batch_length,
            ping_ms: None,
            total_ms,
            server_processing_ns,
            two_way_network_ms,
            one_way_throughput: one_way_throughput(batch_length, two_way_network_ms),
            application_throughput: application_throughput(batch_length, total_ms),
        }
    }

    /// Attach the probe latency measured before the sort request
    pub fn with_ping_latency(mut self, ping_ms: u64) -> Self {
        self.ping_ms = Some(ping_ms);
        self
    }

    /// Server processing time in whole milliseconds
    pub fn server_processing_ms(&self) -> u64 {
        nanos_to_ms(u128::try_from(self.server_processing_ns).unwrap_or(0))
    }

    pub fn application_measured(&self) -> bool {
        is_measured(self.application_throughput)
    }

    pub fn one_way_measured(&self) -> bool {
        is_measured(self.one_way_throughput)
    }

    /// Payload size of the request body in bytes
    pub fn payload_bytes(&self) -> u64 {
        self.batch_length as u64 * BYTES_PER_INT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_truncating_conversion() {
        assert_eq!(nanos_to_ms(0), 0);
        assert_eq!(nanos_to_ms(999_999), 0);
        assert_eq!(nanos_to_ms(1_000_000), 1);
        assert_eq!(duration_to_ms(Duration::from_micros(2_999)), 2);
    }

    #[test]
    fn test_scenario_negligible_server_time() {
        let metrics = RunMetrics::compute(1000, Duration::from_millis(100), 40);

        assert_eq!(metrics.total_ms, 100);
        assert_eq!(metrics.two_way_network_ms, 99);
        assert_eq!(metrics.application_throughput, 10_000.0);
        assert!(metrics.application_measured());
    }

    #[test]
    fn test_scenario_zero_round_trip_uses_sentinel() {
        let metrics = RunMetrics::compute(500, Duration::from_micros(900), 0);

        assert_eq!(metrics.total_ms, 0);
        assert_eq!(metrics.application_throughput, UNMEASURABLE);
        assert_eq!(metrics.application_throughput, -1.0);
        assert!(!metrics.application_measured());
    }

    #[test]
    fn test_zero_network_time_uses_sentinel() {
        // Server accounts for the whole round trip
        let metrics = RunMetrics::compute(250, Duration::from_millis(30), 29_500_000);

        assert_eq!(metrics.two_way_network_ms, 0);
        assert_eq!(metrics.one_way_throughput, UNMEASURABLE);
        assert_eq!(metrics.application_throughput, 250.0 / 0.030);
    }

    #[test]
    fn test_one_way_halves_network_time() {
        // 1000 ints = 4000 bytes over 20ms two-way, 10ms one-way
        assert_eq!(one_way_throughput(1000, 20), 400_000.0);
    }

    #[test]
    fn test_server_time_exceeding_round_trip_saturates() {
        assert_eq!(two_way_network_ms(Duration::from_millis(5), 9_000_000), 0);
    }

    #[test]
    fn test_negative_server_time_counts_as_zero() {
        assert_eq!(two_way_network_ms(Duration::from_millis(12), -5), 12);
    }

    #[test]
    fn test_ping_latency_attached() {
        let metrics = RunMetrics::compute(10, Duration::from_millis(10), 0).with_ping_latency(3);
        assert_eq!(metrics.ping_ms, Some(3));
        assert_eq!(metrics.payload_bytes(), 40);
    }

    proptest! {
        #[test]
        fn prop_two_way_matches_millisecond_subtraction(total_ms in 0u64..1_000_000, server_ms in 0u64..1_000_000) {
            prop_assume!(server_ms <= total_ms);
            let total = Duration::from_millis(total_ms);
            let server_ns = (server_ms * 1_000_000) as i64;

            prop_assert_eq!(two_way_network_ms(total, server_ns), total_ms - server_ms);
        }

        #[test]
        fn prop_two_way_is_truncated_difference(total_ns in 0u64..10_000_000_000, server_ns in 0u64..10_000_000_000) {
            prop_assume!(server_ns <= total_ns);
            let total = Duration::from_nanos(total_ns);

            prop_assert_eq!(two_way_network_ms(total, server_ns as i64), (total_ns - server_ns) / 1_000_000);
        }

        #[test]
        fn prop_throughputs_are_finite(len in 1usize..10_000_000, total_ns in 0u64..10_000_000_000, server_ns in any::<i64>()) {
            let metrics = RunMetrics::compute(len, Duration::from_nanos(total_ns), server_ns);

            prop_assert!(metrics.application_throughput.is_finite());
            prop_assert!(metrics.one_way_throughput.is_finite());
            if metrics.total_ms == 0 {
                prop_assert_eq!(metrics.application_throughput, UNMEASURABLE);
            } else {
                prop_assert!(metrics.application_throughput > 0.0);
            }
            if metrics.two_way_network_ms == 0 {
                prop_assert_eq!(metrics.one_way_throughput, UNMEASURABLE);
            }
        }
    }
}
