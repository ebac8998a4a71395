pub mod cli;
pub mod config;
pub mod engine;
pub mod host;

use once_cell::sync::OnceCell;

use config::Config;

// Global Config instance
static CONFIG: OnceCell<Config> = OnceCell::new();

/// Get a reference to the global Config
pub fn global_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Initialize the global Config once at startup
pub fn init_config(config: Config) -> anyhow::Result<()> {
    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Config already initialized"))
}
