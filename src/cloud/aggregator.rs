//! Accumulation of fog measurement records and system-wide ratios.
//!
//! The aggregator owns an append-only sequence of the window metrics received
//! from all fog uplinks. Each new record is appended and the global ratios are
//! recomputed under the same lock acquisition, so every uplink observes a
//! consistent snapshot that includes its own contribution.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::fog::metrics::WindowMetrics;

/// System-wide performance indicators over all received records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    /// η_BW: cumulative mutual info over cumulative bandwidth.
    pub bandwidth_utilization_efficiency: f64,
    /// Λ: cumulative latency over cumulative transmission attempts.
    pub average_latency: f64,
    /// E: cumulative energy usage.
    pub total_energy: f64,
    /// R: cumulative successful transmissions over attempts.
    pub transmission_reliability: f64,
    /// Θ: cumulative mutual info over cumulative time steps.
    pub throughput: f64,
}

/// Append-only record store with aggregate computation.
pub struct MetricsAggregator {
    records: Mutex<Vec<WindowMetrics>>,
}

/// A ratio with an explicit zero floor for empty denominators.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 { numerator / denominator } else { 0.0 }
}

impl MetricsAggregator {
    pub fn new() -> Self {
        MetricsAggregator {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Append one record and return the aggregate over everything received so
    /// far, including it.
    pub fn ingest(&self, record: WindowMetrics) -> AggregateMetrics {
        let mut records = self.records.lock().expect("aggregator mutex poisoned");
        records.push(record);
        Self::compute(&records)
    }

    /// Number of records received so far.
    pub fn record_count(&self) -> usize {
        self.records.lock().expect("aggregator mutex poisoned").len()
    }

    fn compute(records: &[WindowMetrics]) -> AggregateMetrics {
        let total_mutual_info: f64 = records.iter().map(|r| r.total_mutual_info).sum();
        let total_bandwidth: f64 = records.iter().map(|r| r.total_bandwidth).sum();
        let total_latency: f64 = records.iter().map(|r| r.total_latency).sum();
        let total_energy: f64 = records.iter().map(|r| r.total_energy).sum();
        let successful: u64 = records.iter().map(|r| r.successful_transmissions).sum();
        let attempts: u64 = records.iter().map(|r| r.total_transmissions).sum();
        let time_steps: f64 = records.iter().map(|r| r.time_steps).sum();

        AggregateMetrics {
            bandwidth_utilization_efficiency: ratio(total_mutual_info, total_bandwidth),
            average_latency: ratio(total_latency, attempts as f64),
            total_energy,
            transmission_reliability: ratio(successful as f64, attempts as f64),
            throughput: ratio(total_mutual_info, time_steps),
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mutual_info: f64, bandwidth: f64, latency: f64, energy: f64, transmissions: u64, time_steps: f64) -> WindowMetrics {
        WindowMetrics {
            total_mutual_info: mutual_info,
            total_bandwidth: bandwidth,
            total_latency: latency,
            total_energy: energy,
            successful_transmissions: transmissions,
            total_transmissions: transmissions,
            time_steps,
        }
    }

    #[test]
    fn single_record_ratios() {
        let aggregator = MetricsAggregator::new();
        let aggregate = aggregator.ingest(record(40.0, 80.0, 2.0, 0.5, 4, 2.0));
        assert_eq!(aggregate.bandwidth_utilization_efficiency, 0.5);
        assert_eq!(aggregate.average_latency, 0.5);
        assert_eq!(aggregate.total_energy, 0.5);
        assert_eq!(aggregate.transmission_reliability, 1.0);
        assert_eq!(aggregate.throughput, 20.0);
        assert_eq!(aggregator.record_count(), 1);
    }

    #[test]
    fn ratios_accumulate_across_records() {
        let aggregator = MetricsAggregator::new();
        aggregator.ingest(record(10.0, 100.0, 1.0, 1.0, 10, 5.0));
        let aggregate = aggregator.ingest(record(30.0, 100.0, 3.0, 2.0, 10, 5.0));
        assert_eq!(aggregate.bandwidth_utilization_efficiency, 0.2);
        assert_eq!(aggregate.average_latency, 0.2);
        assert_eq!(aggregate.total_energy, 3.0);
        assert_eq!(aggregate.transmission_reliability, 1.0);
        assert_eq!(aggregate.throughput, 4.0);
    }

    #[test]
    fn reliability_is_one_when_every_attempt_succeeds() {
        let aggregator = MetricsAggregator::new();
        for _ in 0..5 {
            let aggregate = aggregator.ingest(record(1.0, 2.0, 0.1, 0.01, 100, 50.0));
            assert_eq!(aggregate.transmission_reliability, 1.0);
        }
    }

    #[test]
    fn zero_denominators_floor_to_zero() {
        let aggregator = MetricsAggregator::new();
        let aggregate = aggregator.ingest(WindowMetrics::default());
        assert_eq!(aggregate.bandwidth_utilization_efficiency, 0.0);
        assert_eq!(aggregate.average_latency, 0.0);
        assert_eq!(aggregate.transmission_reliability, 0.0);
        assert_eq!(aggregate.throughput, 0.0);
        assert_eq!(aggregate.total_energy, 0.0);
    }
}
