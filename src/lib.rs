//! # fognet — two-tier edge processing pipeline for IoT telemetry streams
//!
//! A fog tier ingests raw packet streams from IoT producers over TCP, batches
//! them in a sliding window, characterizes their information content, selects
//! a network-coding scheme, XOR-encodes and schedules a subset under bandwidth
//! and energy budgets, and forwards the encoded payload plus measurement
//! metadata to a cloud tier. The cloud tier aggregates the metadata across fog
//! messages, computes system-wide performance indicators, and returns a
//! feedback directive that nudges the fog tier's coding degree up or down.
//!
//! ## Architecture Overview
//!
//! Two daemons built from this library:
//!
//! 1. **Fog node** (`fog_node`): TCP server for producer ingress. One accept
//!    thread, one ingest thread per producer connection, one processing thread
//!    per frozen window. Window processing runs the full pipeline — histogram
//!    and entropy kernel, autoregressive entropy forecast, coding-parameter
//!    selection, group-wise XOR encoding, two-constraint knapsack scheduling,
//!    metrics synthesis — and exchanges one framed message with the cloud.
//!
//! 2. **Cloud node** (`cloud_node`): TCP server for fog uplinks. One handler
//!    thread per inbound connection; each handler splits the frame, folds the
//!    metadata into the running aggregate, appends a line to the metrics log,
//!    and replies with a JSON feedback directive.
//!
//! ## Data Flow
//!
//! producer → transport (fog) → window buffer → {entropy kernel, predictor,
//! coding selector, XOR coder, scheduler, metrics assembler} → frame codec →
//! transport (→ cloud) → aggregator → {record log, feedback policy} →
//! transport (→ fog reply)
//!
//! ## Module Organization
//!
//! - `config`: TOML-backed configuration for both tiers
//! - `frame`: wire-frame split/join (`payload || metadata-json`)
//! - `transport`: blocking TCP servers and the one-shot uplink client
//! - `fog`: the windowed-processing pipeline and fog orchestration
//! - `cloud`: aggregation, feedback policy, record log, cloud orchestration

pub mod cloud;
pub mod config;
pub mod fog;
pub mod frame;
pub mod transport;
