/// Schema-driven CLI argument parsing - Gateway
mod builder;
mod schema;

pub use builder::{
    build_command, get_cli_argument, get_cli_argument_from, parse_arguments, ParsedArguments,
};
pub use schema::{ArgType, ArgValue, ArgumentSpec, CliSchema};
