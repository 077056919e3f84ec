use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use std::ffi::OsString;
use std::path::Path;
use tracing::debug;

use super::schema::{ArgType, ArgValue, ArgumentSpec, CliSchema};

/// Flat mapping from argument name to its parsed value, in schema order.
///
/// Every schema entry has a slot; it is `None` when the flag was not given
/// and the entry has no default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedArguments {
    values: Vec<(String, Option<ArgValue>)>,
}

impl ParsedArguments {
    fn from_matches(schema: &CliSchema, matches: &ArgMatches) -> Self {
        let values = schema
            .arguments
            .iter()
            .map(|spec| {
                let value = matches
                    .get_one::<ArgValue>(&spec.name)
                    .cloned()
                    .or_else(|| spec.default.clone());
                (spec.name.clone(), value)
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ArgValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ArgValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether the schema declared `name` (set or not)
    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(key, _)| key == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ArgValue>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// JSON object view; unset arguments become `null`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(name, value)| {
                    let json = value
                        .as_ref()
                        .and_then(|v| serde_json::to_value(v).ok())
                        .unwrap_or(serde_json::Value::Null);
                    (name.clone(), json)
                })
                .collect(),
        )
    }
}

/// Build a clap command with one `--<name>` option per schema entry
pub fn build_command(schema: &CliSchema) -> Command {
    schema
        .arguments
        .iter()
        .fold(
            Command::new(env!("CARGO_PKG_NAME")).about(schema.description.clone()),
            |command, spec| command.arg(build_arg(spec)),
        )
}

fn build_arg(spec: &ArgumentSpec) -> Arg {
    let arg_type = spec.arg_type;
    let choices = spec.choices.clone();

    let mut arg = Arg::new(spec.name.clone())
        .long(spec.name.clone())
        .value_name(spec.name.to_uppercase())
        .action(ArgAction::Set)
        .required(spec.required)
        .allow_negative_numbers(matches!(arg_type, ArgType::Int | ArgType::Float))
        .value_parser(move |raw: &str| -> Result<ArgValue, String> {
            let value = arg_type.convert(raw)?;
            if !choices.is_empty() && !choices.contains(&value) {
                return Err(format!(
                    "invalid choice: '{}' (choose from {})",
                    raw,
                    join_values(&choices)
                ));
            }
            Ok(value)
        });

    let mut help = spec.help.clone().unwrap_or_default();
    if !spec.choices.is_empty() {
        help.push_str(&format!(" [choices: {}]", join_values(&spec.choices)));
    }
    if let Some(default) = &spec.default {
        help.push_str(&format!(" [default: {}]", default));
    }
    let help = help.trim();
    if !help.is_empty() {
        arg = arg.help(help.to_string());
    }

    arg
}

fn join_values(values: &[ArgValue]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse `args` (program name first) against `schema`
pub fn parse_arguments<I, T>(schema: &CliSchema, args: I) -> Result<ParsedArguments, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command(schema).try_get_matches_from(args)?;
    Ok(ParsedArguments::from_matches(schema, &matches))
}

/// Load the schema at `schema_path` and parse the process arguments.
///
/// This is a process boundary: a bad schema file prints a message and exits
/// with status 1, an argument error prints clap's diagnostic and exits with
/// clap's status.
pub fn get_cli_argument(schema_path: impl AsRef<Path>) -> ParsedArguments {
    get_cli_argument_from(schema_path, std::env::args_os())
}

/// Same as [`get_cli_argument`] with an explicit argument list
pub fn get_cli_argument_from<I, T>(schema_path: impl AsRef<Path>, args: I) -> ParsedArguments
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let schema = match CliSchema::from_file(schema_path.as_ref()) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    match parse_arguments(&schema, args) {
        Ok(parsed) => {
            debug!("Parsed {} CLI arguments", parsed.len());
            parsed
        }
        Err(e) => e.exit(),
    }
}
