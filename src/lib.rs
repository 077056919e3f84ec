pub mod app;
pub mod cache;
pub mod cli;
pub mod constants;
pub mod utils;

pub use app::{load_config_from_toml, ConfigHandler, Provider};
pub use cache::{CacheHandler, Record};
pub use cli::{get_cli_argument, parse_arguments, CliSchema, ParsedArguments};
pub use utils::{Result, TemplateError};
