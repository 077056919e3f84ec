use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use script_template::{
    app::{ConfigHandler, Provider},
    cache::CacheHandler,
    cli::get_cli_argument,
    constants::{CLI_CONFIG_PATH_ENV, CONFIG_PATH_ENV, DEFAULT_CLI_CONFIG_FILE, DEFAULT_CONFIG_FILE},
    utils::{format_timestamp, init_logger},
};

fn main() -> Result<()> {
    // Set up console + file logging
    init_logger().context("Failed to initialize logging")?;

    let provider = load_provider()?;

    // Parse CLI arguments from the schema file; exits on bad input
    let schema_path = env_path(CLI_CONFIG_PATH_ENV, DEFAULT_CLI_CONFIG_FILE);
    let arguments = get_cli_argument(&schema_path);
    info!("Parsed arguments from {}", schema_path.display());

    // Record this run when a cache store is configured
    if let Some(cache_path) = provider.config_handler().get_opt::<PathBuf>("cache.path") {
        let mut cache = CacheHandler::open(&cache_path)
            .with_context(|| format!("Failed to open cache store {}", cache_path.display()))?;
        let now = chrono::Local::now().timestamp() as f64;

        if cache.exists("last_run", None)? {
            cache.update("last_run", "arguments", arguments.to_json(), None)?;
        } else {
            cache.save("last_run", "arguments", arguments.to_json(), None)?;
        }
        if let Some(stamp) = format_timestamp(now, None) {
            cache.update("last_run", "at", stamp, None)?;
        }
        cache.close()?;
    }

    println!("{}", serde_json::to_string_pretty(&arguments.to_json())?);
    Ok(())
}

/// Load the configuration file, tolerating a missing default file
fn load_provider() -> Result<Provider> {
    let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if explicit.is_none() && !config_path.exists() {
        warn!("No {} found, using an empty configuration", DEFAULT_CONFIG_FILE);
        let empty = ConfigHandler::from_table(toml::Table::new())?;
        return Ok(Provider::from_handler(empty));
    }

    Provider::new(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
