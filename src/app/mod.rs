// Gateway module for app - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod config;
mod provider;

// Public re-exports - the ONLY way to access app functionality
pub use config::{load_config_from_toml, ConfigHandler};
pub use provider::Provider;
