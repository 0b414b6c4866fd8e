//! Cloud-tier daemon: aggregates fog measurement records, keeps the metrics
//! log, and answers every uplink with a feedback directive.

use env_logger::Builder;
use log::LevelFilter;
use std::path::PathBuf;

use fognet::cloud;
use fognet::config::CloudConfig;

/// Environment variable overriding the configuration file path.
const CONFIG_ENV: &str = "CLOUD_NODE_CONFIG";
/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "cloud_node.toml";

fn main() -> anyhow::Result<()> {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("fognet"), LevelFilter::Debug)
        .init();

    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = CloudConfig::load_or_default(&config_path)?;

    log::info!("Starting cloud node on {}", config.listen_addr);
    cloud::node::run(config)
}
