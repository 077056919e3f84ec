/// Constants module to avoid magic numbers in the codebase

// Cache store
pub const DEFAULT_TABLE: &str = "_default";
pub const RECORD_NAME_FIELD: &str = "name";
pub const DEFAULT_FLUSH_THRESHOLD: usize = 1000; // writes buffered before an automatic flush

// Hashing
pub const HASH_CHUNK_SIZE: usize = 4096;

// Time
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// Logging
pub const LOG_DIR: &str = "./logs";
pub const LOG_FILE_NAME: &str = "template.log";
pub const DEFAULT_LOG_FILTER: &str = "info";

// Configuration
pub const ENV_PREFIX: &str = "SCRIPT_TEMPLATE_";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_CLI_CONFIG_FILE: &str = "cli_config.toml";
pub const CONFIG_PATH_ENV: &str = "SCRIPT_TEMPLATE_CONFIG";
pub const CLI_CONFIG_PATH_ENV: &str = "SCRIPT_TEMPLATE_CLI_CONFIG";

// CLI
pub const DEFAULT_CLI_DESCRIPTION: &str = "CLI Tool";
