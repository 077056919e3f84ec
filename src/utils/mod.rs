// Gateway module for utils - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod errors;
mod fs;
mod logger;
mod time;

// Public re-exports - the ONLY way to access utils functionality
pub use errors::{Result, TemplateError};
pub use fs::{ensure_dir, sha256_file};
pub use logger::{init_logger, init_logger_in};
pub use time::{format_timestamp, is_within_days};
