//! Cloud-node orchestration: frame handling and the uplink server loop.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use crate::config::CloudConfig;
use crate::fog::metrics::WindowMetrics;
use crate::frame;
use crate::transport::TcpServer;

use super::aggregator::MetricsAggregator;
use super::feedback;
use super::record_log::MetricsLog;

/// Cloud-tier state shared by all handler threads.
pub struct CloudNode {
    aggregator: MetricsAggregator,
    metrics_log: MetricsLog,
}

impl CloudNode {
    pub fn new(config: &CloudConfig) -> anyhow::Result<Self> {
        Ok(CloudNode {
            aggregator: MetricsAggregator::new(),
            metrics_log: MetricsLog::open(Path::new(&config.metrics_log_path))?,
        })
    }

    /// Handle one framed uplink message and produce the reply bytes.
    ///
    /// A frame without the separator earns the `FormatError` literal.
    /// Metadata that fails to parse contributes an all-zero record; the
    /// aggregate still advances and a log line is still appended.
    pub fn handle_frame(&self, request: &[u8], peer: SocketAddr) -> Vec<u8> {
        let (payload, metadata) = match frame::split(request) {
            Ok(parts) => parts,
            Err(err) => {
                log::error!("Bad frame from {peer}: {err}");
                return frame::FORMAT_ERROR_REPLY.to_vec();
            }
        };
        log::info!(
            "Frame from {peer}: {} payload bytes, {} metadata bytes",
            payload.len(),
            metadata.len()
        );

        let record = parse_metadata(metadata, peer);
        let aggregate = self.aggregator.ingest(record);
        log::info!(
            "Aggregate after {} records: efficiency {:.3}, reliability {:.3}, throughput {:.3}",
            self.aggregator.record_count(),
            aggregate.bandwidth_utilization_efficiency,
            aggregate.transmission_reliability,
            aggregate.throughput
        );
        self.metrics_log.append(&aggregate);

        let directive = feedback::evaluate(aggregate);
        log::info!("Feedback for {peer}: adjust_dt {}, {}", directive.adjust_dt, directive.message);
        match serde_json::to_string(&directive) {
            Ok(json) => json.into_bytes(),
            Err(err) => {
                log::error!("Failed to serialize directive for {peer}: {err}");
                Vec::new()
            }
        }
    }

    pub fn aggregator(&self) -> &MetricsAggregator {
        &self.aggregator
    }
}

/// Parse the metadata side of a frame into the window metrics the aggregator
/// consumes. Unknown keys are ignored; missing keys and parse failures
/// default to zero contribution.
fn parse_metadata(metadata: &[u8], peer: SocketAddr) -> WindowMetrics {
    let text = match std::str::from_utf8(metadata) {
        Ok(text) => text,
        Err(err) => {
            log::error!("Metadata from {peer} is not UTF-8: {err}");
            return WindowMetrics::default();
        }
    };
    match serde_json::from_str::<WindowMetrics>(text) {
        Ok(record) => record,
        Err(err) => {
            log::error!("Failed to parse metadata from {peer}: {err}");
            WindowMetrics::default()
        }
    }
}

/// Bind the uplink server and handle fog connections until process exit.
pub fn run(config: CloudConfig) -> anyhow::Result<()> {
    let node = Arc::new(CloudNode::new(&config)?);
    let server = TcpServer::bind(&config.listen_addr)?;
    server.serve_framed(move |request, peer| node.handle_frame(request, peer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::feedback::FeedbackDirective;
    use crate::fog::coding::CodingScheme;
    use crate::fog::metrics::ControlMetadata;
    use crate::transport;
    use std::thread;
    use std::time::Duration;

    fn test_node(dir: &tempfile::TempDir) -> CloudNode {
        let config = CloudConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            metrics_log_path: dir.path().join("performance_metrics.log").to_string_lossy().to_string(),
        };
        CloudNode::new(&config).unwrap()
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn metadata_json() -> String {
        serde_json::to_string(&ControlMetadata {
            current_entropy: 7.9,
            predicted_entropy: 7.2,
            coding_scheme: CodingScheme::Rlnc,
            coding_degree: 6,
            num_scheduled: 4,
            metrics: WindowMetrics {
                total_mutual_info: 31.6,
                total_bandwidth: 4000.0,
                total_latency: 0.2,
                total_energy: 4.0,
                successful_transmissions: 4,
                total_transmissions: 4,
                time_steps: 2.0,
            },
        })
        .unwrap()
    }

    #[test]
    fn well_formed_frame_earns_a_directive() {
        let dir = tempfile::tempdir().unwrap();
        let node = test_node(&dir);
        let request = frame::encode(b"encoded-bytes", &metadata_json());

        let reply = node.handle_frame(&request, peer());
        let directive: FeedbackDirective = serde_json::from_slice(&reply).unwrap();
        assert!(directive.adjustment_is_valid());
        assert_eq!(directive.aggregated_metrics.transmission_reliability, 1.0);
        // 31.6 / 4000 is well under the efficiency floor
        assert_eq!(directive.adjust_dt, -1);
        assert_eq!(node.aggregator().record_count(), 1);
    }

    #[test]
    fn frame_without_separator_earns_the_format_error_literal() {
        let dir = tempfile::tempdir().unwrap();
        let node = test_node(&dir);
        let reply = node.handle_frame(b"just some bytes", peer());
        assert_eq!(reply, frame::FORMAT_ERROR_REPLY);
        assert_eq!(node.aggregator().record_count(), 0);
    }

    #[test]
    fn unparseable_metadata_still_advances_the_aggregate() {
        let dir = tempfile::tempdir().unwrap();
        let node = test_node(&dir);
        let request = frame::encode(b"payload", "not json at all");

        let reply = node.handle_frame(&request, peer());
        let directive: FeedbackDirective = serde_json::from_slice(&reply).unwrap();
        // Zero record: every ratio floors to zero, which is below the
        // efficiency floor.
        assert_eq!(directive.adjust_dt, -1);
        assert_eq!(directive.aggregated_metrics.total_energy, 0.0);
        assert_eq!(node.aggregator().record_count(), 1);

        let log_content = std::fs::read_to_string(dir.path().join("performance_metrics.log")).unwrap();
        assert_eq!(log_content.lines().count(), 1);
    }

    #[test]
    fn each_received_record_is_logged_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let node = test_node(&dir);
        for _ in 0..3 {
            node.handle_frame(&frame::encode(b"p", &metadata_json()), peer());
        }
        let log_content = std::fs::read_to_string(dir.path().join("performance_metrics.log")).unwrap();
        assert_eq!(log_content.lines().count(), 3);
        for line in log_content.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value["bandwidth_utilization_efficiency"].is_number());
        }
    }

    #[test]
    fn uplink_round_trip_over_tcp() {
        let dir = tempfile::tempdir().unwrap();
        let node = Arc::new(test_node(&dir));
        let server = TcpServer::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();
        let handler = Arc::clone(&node);
        thread::spawn(move || {
            server
                .serve_framed(move |request, peer| handler.handle_frame(request, peer))
                .unwrap();
        });

        let request = frame::encode(b"encoded-window", &metadata_json());
        let reply = transport::exchange(&addr.to_string(), &request, Duration::from_secs(5)).unwrap();
        let directive: FeedbackDirective = serde_json::from_slice(&reply).unwrap();
        assert!(directive.adjustment_is_valid());
        assert_eq!(node.aggregator().record_count(), 1);
    }
}
