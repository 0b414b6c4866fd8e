//! Per-window metrics synthesis and the wire metadata record.
//!
//! Bandwidth, latency, and energy are synthesized with uniform jitter rather
//! than measured; they are advisory telemetry whose distribution the cloud
//! aggregation depends on. Reproducible runs seed the jitter generator
//! through the fog configuration.

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use super::coding::CodingScheme;

/// Relative jitter on per-packet bandwidth and energy usage.
const USAGE_JITTER: f64 = 0.1;
/// Energy drawn per payload byte before jitter.
const ENERGY_PER_BYTE: f64 = 0.001;
/// Per-packet latency draw bounds (seconds).
const LATENCY_RANGE: (f64, f64) = (0.01, 0.1);
/// Window coverage time per packet.
const TIME_STEP_PER_PACKET: f64 = 0.5;

/// Synthesized telemetry for one processed window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowMetrics {
    /// Sum of per-packet entropies (bits).
    pub total_mutual_info: f64,
    /// Jittered cumulative payload bytes.
    pub total_bandwidth: f64,
    /// Cumulative per-packet latency draws (seconds).
    pub total_latency: f64,
    /// Jittered cumulative energy usage.
    pub total_energy: f64,
    pub successful_transmissions: u64,
    pub total_transmissions: u64,
    /// Window coverage time.
    pub time_steps: f64,
}

/// Measurement metadata attached to every framed message, serialized as the
/// JSON object the cloud aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMetadata {
    pub current_entropy: f64,
    pub predicted_entropy: f64,
    pub coding_scheme: CodingScheme,
    pub coding_degree: usize,
    pub num_scheduled: usize,
    #[serde(flatten)]
    pub metrics: WindowMetrics,
}

/// Synthesize the metrics tuple for one window.
pub fn assemble_window_metrics<R: Rng>(packets: &[Vec<u8>], packet_entropies: &[f64], rng: &mut R) -> WindowMetrics {
    let jitter = Uniform::new(-USAGE_JITTER, USAGE_JITTER);
    let latency = Uniform::new(LATENCY_RANGE.0, LATENCY_RANGE.1);

    let total_mutual_info = packet_entropies.iter().sum();
    let total_bandwidth = packets
        .iter()
        .map(|packet| packet.len() as f64 * (1.0 + jitter.sample(rng)))
        .sum();
    let total_latency = packets.iter().map(|_| latency.sample(rng)).sum();
    let total_energy = packets
        .iter()
        .map(|packet| packet.len() as f64 * ENERGY_PER_BYTE * (1.0 + jitter.sample(rng)))
        .sum();

    WindowMetrics {
        total_mutual_info,
        total_bandwidth,
        total_latency,
        total_energy,
        successful_transmissions: packets.len() as u64,
        total_transmissions: packets.len() as u64,
        time_steps: TIME_STEP_PER_PACKET * packets.len() as f64,
    }
}
