use std::sync::OnceLock;

pub mod config;
pub mod sample;

use crate::logs::init_logging;
use config::CacheConfig;

pub static CONF: OnceLock<CacheConfig> = OnceLock::new();

/// Initialize the traceflux core components: logging first, then the engine
/// configuration. Safe to call more than once.
pub fn initialize() {
    init_logging();
    load_config();
    tracing::info!("traceflux initialized");
}

/// Load the engine configuration and cache it for the process lifetime.
///
/// The configuration file is expected to be in TOML format; its path is
/// taken from the `TRACEFLUX_CONFIG` environment variable. Without the
/// variable the built-in defaults apply.
pub fn load_config() -> &'static CacheConfig {
    CONF.get_or_init(|| match std::env::var("TRACEFLUX_CONFIG") {
        Ok(path) => {
            let s = std::fs::read_to_string(&path).expect("read config");
            toml::from_str(&s).expect("parse config")
        }
        Err(_) => CacheConfig::default(),
    })
}
