//! Fog-tier daemon: producer ingress server plus the windowed-processing
//! pipeline and the framed cloud exchange.

use env_logger::Builder;
use log::LevelFilter;
use std::path::PathBuf;

use fognet::config::FogConfig;
use fognet::fog;

/// Environment variable overriding the configuration file path.
const CONFIG_ENV: &str = "FOG_NODE_CONFIG";
/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "fog_node.toml";

fn main() -> anyhow::Result<()> {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("fognet"), LevelFilter::Debug)
        .init();

    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = FogConfig::load_or_default(&config_path)?;

    log::info!("Starting fog node on {}", config.listen_addr);
    fog::node::run(config)
}
