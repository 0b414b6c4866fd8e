//! Fog-node orchestration: ingress wiring, per-window processing threads,
//! and the framed cloud exchange.
//!
//! The window buffer and the entropy history are the only mutable shared
//! state on the fog side; both live behind one mutex. Ingest threads hold it
//! for the push/detach, and each processing thread re-acquires it for the
//! history append and forecast. Processing a detached window never blocks
//! further ingestion.

use rand::{SeedableRng, rngs::StdRng};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::cloud::feedback::FeedbackDirective;
use crate::config::FogConfig;
use crate::frame;
use crate::transport::{self, TcpServer};

use super::coding;
use super::entropy::{self, HISTOGRAM_BINS};
use super::metrics::{self, ControlMetadata};
use super::predictor::EntropyPredictor;
use super::scheduler::{self, COST_SCALE};
use super::window::{Window, WindowBuffer};

/// Producer ingress idle timeout.
pub const INGRESS_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect/receive budget for the cloud exchange.
pub const UPLINK_TIMEOUT: Duration = Duration::from_secs(5);

/// Hook invoked with every frozen window and its per-packet histograms before
/// encoding. Extension point for window-level analysis (e.g. a tensor
/// decomposition of the histogram stack); errors are logged and swallowed,
/// and nothing downstream consumes the result.
pub trait WindowObserver: Send + Sync {
    fn window_ready(&self, window: &Window, histograms: &[[f64; HISTOGRAM_BINS]]) -> anyhow::Result<()>;
}

/// Mutable fog state guarded by the single fog mutex.
struct SharedState {
    buffer: WindowBuffer,
    predictor: EntropyPredictor,
}

/// Fog-tier state shared by ingest and processing threads.
pub struct FogNode {
    config: FogConfig,
    shared: Mutex<SharedState>,
    observer: Option<Box<dyn WindowObserver>>,
}

impl FogNode {
    pub fn new(config: FogConfig) -> Self {
        log::info!(
            "Fog node ready: cloud at {}, window size {}",
            config.cloud_addr,
            config.window_size
        );
        let shared = SharedState {
            buffer: WindowBuffer::new(config.window_size),
            predictor: EntropyPredictor::new(&config),
        };
        FogNode {
            config,
            shared: Mutex::new(shared),
            observer: None,
        }
    }

    /// Attach a window observer to an otherwise default node.
    pub fn with_observer(config: FogConfig, observer: Box<dyn WindowObserver>) -> Self {
        let mut node = Self::new(config);
        node.observer = Some(observer);
        node
    }

    /// Ingress callback: append one packet body, and hand a frozen window to
    /// its own processing thread when the buffer fills.
    pub fn accept_packet(self: &Arc<Self>, data: &[u8], peer: SocketAddr) {
        log::info!("Received {} byte packet from {peer}", data.len());
        let frozen = {
            let mut shared = self.shared.lock().expect("fog mutex poisoned");
            shared.buffer.push(data.to_vec())
        };
        if let Some(window) = frozen {
            log::info!("Window {} is full, starting processing", window.index);
            let node = Arc::clone(self);
            let spawned = thread::Builder::new()
                .name(format!("window-{}", window.index))
                .spawn(move || node.process_window(window));
            if let Err(err) = spawned {
                log::error!("Failed to spawn processing thread: {err}");
            }
        }
    }

    /// Run the full pipeline on a frozen window and exchange one framed
    /// message with the cloud. Failures discard the window's work; there is
    /// no retry.
    pub fn process_window(&self, window: Window) {
        let (metadata, encoded) = self.analyze_window(&window);
        let metadata_json = match serde_json::to_string(&metadata) {
            Ok(json) => json,
            Err(err) => {
                log::error!("Failed to serialize metadata for window {}: {err}", window.index);
                return;
            }
        };
        let message = frame::encode(&encoded, &metadata_json);
        match transport::exchange(&self.config.cloud_addr, &message, UPLINK_TIMEOUT) {
            Ok(reply) => match serde_json::from_slice::<FeedbackDirective>(&reply) {
                Ok(directive) if directive.adjustment_is_valid() => {
                    log::info!(
                        "Cloud feedback for window {}: adjust_dt {}, {}",
                        window.index,
                        directive.adjust_dt,
                        directive.message
                    );
                }
                Ok(directive) => {
                    log::warn!(
                        "Cloud feedback for window {} carries unknown adjustment {}",
                        window.index,
                        directive.adjust_dt
                    );
                }
                Err(err) => {
                    log::warn!(
                        "Unexpected cloud reply for window {} ({err}): {}",
                        window.index,
                        String::from_utf8_lossy(&reply)
                    );
                }
            },
            Err(err) => {
                log::error!("Cloud exchange failed, discarding window {}: {err:#}", window.index);
            }
        }
    }

    /// The CPU-bound pipeline: entropy characterization, forecast, coding
    /// selection, XOR encoding, scheduling, and metrics synthesis.
    fn analyze_window(&self, window: &Window) -> (ControlMetadata, Vec<u8>) {
        let packets = &window.packets;
        log::info!("Processing window {} with {} packets", window.index, packets.len());

        let histograms: Vec<[f64; HISTOGRAM_BINS]> =
            packets.iter().map(|packet| entropy::byte_histogram(packet)).collect();
        let packet_entropies: Vec<f64> = histograms.iter().map(entropy::packet_entropy).collect();

        if let Some(observer) = &self.observer {
            if let Err(err) = observer.window_ready(window, &histograms) {
                log::warn!("Window observer failed on window {}: {err:#}", window.index);
            }
        }

        let current_entropy = entropy::window_entropy(&packet_entropies);
        let predicted_entropy = {
            let mut shared = self.shared.lock().expect("fog mutex poisoned");
            shared.predictor.record(current_entropy);
            shared.predictor.forecast()
        };
        log::info!(
            "Window {} entropy {:.3} bits, forecast {:.3} bits",
            window.index,
            current_entropy,
            predicted_entropy
        );

        let decision = coding::select_coding(current_entropy, self.config.entropy_low, self.config.entropy_med);
        log::info!("Window {}: scheme {}, degree {}", window.index, decision.scheme, decision.degree);
        let encoded = coding::xor_encode(packets, decision.degree);
        log::info!("Window {} encoded to {} bytes", window.index, encoded.len());

        let mut rng = self.window_rng(window.index);
        let items = scheduler::priced_items(&packet_entropies, &self.config, &mut rng);
        let selected = scheduler::solve_knapsack(
            &items,
            self.config.bandwidth_capacity * COST_SCALE,
            self.config.energy_capacity * COST_SCALE,
        );
        log::info!("Window {}: scheduled {} of {} packets", window.index, selected.len(), packets.len());

        let window_metrics = metrics::assemble_window_metrics(packets, &packet_entropies, &mut rng);
        let metadata = ControlMetadata {
            current_entropy,
            predicted_entropy,
            coding_scheme: decision.scheme,
            coding_degree: decision.degree,
            num_scheduled: selected.len(),
            metrics: window_metrics,
        };
        (metadata, encoded)
    }

    /// Jitter generator for one window: seeded deterministically per window
    /// when the configuration carries a seed, OS entropy otherwise.
    fn window_rng(&self, window_index: u64) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ window_index),
            None => StdRng::from_entropy(),
        }
    }
}

/// Bind the producer ingress server and feed the pipeline until process exit.
pub fn run(config: FogConfig) -> anyhow::Result<()> {
    let server = TcpServer::bind(&config.listen_addr)?;
    let node = Arc::new(FogNode::new(config));
    server.serve_packet_stream(INGRESS_IDLE_TIMEOUT, move |data, peer| node.accept_packet(data, peer))
}
