//! Fog-tier windowed-processing pipeline.
//!
//! This module provides the complete fog-side infrastructure:
//! - Sliding-window packet accumulation with atomic handoff
//! - Per-packet histogram construction and Shannon entropy estimation
//! - Autoregressive entropy forecasting with a short-history fallback
//! - Entropy-thresholded coding-parameter selection and group XOR encoding
//! - Priority-weighted two-constraint knapsack scheduling
//! - Per-window metrics synthesis and the framed cloud exchange
//!
//! ## Module Organization
//!
//! - `window`: window buffer and frozen windows
//! - `entropy`: histogram/entropy numeric kernel
//! - `predictor`: AR(3)/AR(1) entropy forecaster
//! - `coding`: scheme selection and XOR coder
//! - `scheduler`: two-constraint 0/1 knapsack and item pricing
//! - `metrics`: window metrics synthesis and the wire metadata record
//! - `node`: `FogNode` orchestration and the ingress server loop
//!
//! ## Public API
//!
//! The main entry point is [`node::run`], which binds the producer ingress
//! server and drives the pipeline for every frozen window.

pub mod coding;
pub mod entropy;
pub mod metrics;
pub mod node;
pub mod predictor;
pub mod scheduler;
pub mod window;

pub use node::{FogNode, WindowObserver};
pub use window::{Window, WindowBuffer};
