//! Configuration loading for the fog and cloud daemons.
//!
//! Both tiers read an optional TOML file; a missing file yields the
//! compiled-in defaults. Loaded values pass a validation step before a node is
//! constructed from them.

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Configuration for the fog-tier daemon.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    /// Address the producer ingress server binds to.
    pub listen_addr: String,
    /// Address of the cloud node's uplink server.
    pub cloud_addr: String,
    /// Packets per window (W).
    pub window_size: usize,
    /// Low-entropy threshold (bits) for coding selection.
    pub entropy_low: f64,
    /// Medium-entropy threshold (bits) for coding selection.
    pub entropy_med: f64,
    /// AR(3) forecast weights for the three most recent window entropies.
    pub ar3_weights: [f64; 3],
    /// AR(3) forecast bias term.
    pub ar3_bias: f64,
    /// AR(1) fallback slope, applied while history is short.
    pub ar1_alpha: f64,
    /// AR(1) fallback intercept.
    pub ar1_beta: f64,
    /// Scheduling value weight on packet entropy (γ₁).
    pub value_weight_entropy: f64,
    /// Scheduling value weight on packet energy (γ₂).
    pub value_weight_energy: f64,
    /// Base per-packet bandwidth cost before jitter.
    pub base_bandwidth: f64,
    /// Base per-packet energy cost before jitter.
    pub base_energy: f64,
    /// Knapsack bandwidth capacity (scaled ×10 internally, like the costs).
    pub bandwidth_capacity: u32,
    /// Knapsack energy capacity (scaled ×10 internally, like the costs).
    pub energy_capacity: u32,
    /// Optional deterministic seed for the per-window jitter generators.
    pub rng_seed: Option<u64>,
}

impl Default for FogConfig {
    fn default() -> Self {
        FogConfig {
            listen_addr: "0.0.0.0:6000".to_string(),
            cloud_addr: "cloud_node:6001".to_string(),
            window_size: 100,
            entropy_low: 4.0,
            entropy_med: 6.0,
            ar3_weights: [0.5, 0.3, 0.2],
            ar3_bias: 0.1,
            ar1_alpha: 0.9,
            ar1_beta: 0.1,
            value_weight_entropy: 1.0,
            value_weight_energy: 0.5,
            base_bandwidth: 1.0,
            base_energy: 1.0,
            bandwidth_capacity: 60,
            energy_capacity: 60,
            rng_seed: None,
        }
    }
}

/// Configuration for the cloud-tier daemon.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Address the fog uplink server binds to.
    pub listen_addr: String,
    /// Path of the append-only line-delimited metrics log.
    pub metrics_log_path: String,
}

impl Default for CloudConfig {
    fn default() -> Self {
        CloudConfig {
            listen_addr: "0.0.0.0:6001".to_string(),
            metrics_log_path: "performance_metrics.log".to_string(),
        }
    }
}

impl FogConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            log::info!("No config file at {}, using defaults", path.display());
            FogConfig::default()
        };
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Returns
    ///
    /// `Ok(())` if validation passes, `Err(String)` with a description otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.window_size == 0 {
            return Err("window_size must be at least 1".to_string());
        }
        if self.entropy_low >= self.entropy_med {
            return Err(format!(
                "entropy thresholds out of order: low {} must be below med {}",
                self.entropy_low, self.entropy_med
            ));
        }
        if self.bandwidth_capacity == 0 || self.energy_capacity == 0 {
            return Err("knapsack capacities must be positive".to_string());
        }
        if self.base_bandwidth <= 0.0 || self.base_energy <= 0.0 {
            return Err("base bandwidth and energy costs must be positive".to_string());
        }
        Ok(())
    }
}

impl CloudConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return Ok(CloudConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
