use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::constants::DEFAULT_CLI_DESCRIPTION;
use crate::utils::{Result, TemplateError};

/// Value types a schema entry may declare.
///
/// This is a closed set: type names are looked up here and never evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgType {
    #[default]
    Str,
    Int,
    Float,
    Bool,
}

impl FromStr for ArgType {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "str" | "string" => Ok(ArgType::Str),
            "int" => Ok(ArgType::Int),
            "float" => Ok(ArgType::Float),
            "bool" => Ok(ArgType::Bool),
            other => Err(TemplateError::Schema(format!(
                "unknown argument type '{}' (expected one of: str, int, float, bool)",
                other
            ))),
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgType::Str => "str",
            ArgType::Int => "int",
            ArgType::Float => "float",
            ArgType::Bool => "bool",
        };
        f.write_str(name)
    }
}

impl ArgType {
    /// Convert raw command-line text into a typed value
    pub fn convert(&self, raw: &str) -> std::result::Result<ArgValue, String> {
        match self {
            ArgType::Str => Ok(ArgValue::Str(raw.to_string())),
            ArgType::Int => raw
                .trim()
                .parse::<i64>()
                .map(ArgValue::Int)
                .map_err(|_| format!("invalid int value: '{}'", raw)),
            ArgType::Float => raw
                .trim()
                .parse::<f64>()
                .map(ArgValue::Float)
                .map_err(|_| format!("invalid float value: '{}'", raw)),
            ArgType::Bool => parse_bool(raw)
                .map(ArgValue::Bool)
                .ok_or_else(|| format!("invalid bool value: '{}'", raw)),
        }
    }

    /// Coerce a value written in the schema file (a default or a choice)
    fn coerce(&self, value: &toml::Value) -> Option<ArgValue> {
        match (self, value) {
            (ArgType::Str, toml::Value::String(s)) => Some(ArgValue::Str(s.clone())),
            (ArgType::Str, other) => Some(ArgValue::Str(other.to_string())),
            (ArgType::Int, toml::Value::Integer(i)) => Some(ArgValue::Int(*i)),
            (ArgType::Float, toml::Value::Float(f)) => Some(ArgValue::Float(*f)),
            (ArgType::Float, toml::Value::Integer(i)) => Some(ArgValue::Float(*i as f64)),
            (ArgType::Bool, toml::Value::Boolean(b)) => Some(ArgValue::Bool(*b)),
            (ty, toml::Value::String(s)) => ty.convert(s).ok(),
            _ => None,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// A typed argument value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::Int(i) => write!(f, "{}", i),
            ArgValue::Float(x) => write!(f, "{}", x),
            ArgValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One `--flag` described by the schema
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSpec {
    pub name: String,
    pub arg_type: ArgType,
    pub required: bool,
    pub choices: Vec<ArgValue>,
    pub default: Option<ArgValue>,
    pub help: Option<String>,
}

/// Declarative description of a command line
#[derive(Debug, Clone, PartialEq)]
pub struct CliSchema {
    pub description: String,
    pub arguments: Vec<ArgumentSpec>,
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    description: Option<String>,
    #[serde(default)]
    arguments: toml::Table,
}

#[derive(Debug, Deserialize)]
struct RawArgument {
    #[serde(rename = "type")]
    arg_type: Option<String>,
    #[serde(default)]
    required: bool,
    choices: Option<Vec<toml::Value>>,
    default: Option<toml::Value>,
    help: Option<String>,
}

impl CliSchema {
    /// Read and validate a schema file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TemplateError::Schema(format!("unable to read '{}': {}", path.display(), e))
        })?;
        content.parse::<CliSchema>().map_err(|e| match e {
            TemplateError::Schema(msg) => {
                TemplateError::Schema(format!("{} (in '{}')", msg, path.display()))
            }
            other => other,
        })
    }

    /// Look up an argument by name
    pub fn argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

impl FromStr for CliSchema {
    type Err = TemplateError;

    fn from_str(content: &str) -> Result<Self> {
        let raw: RawSchema = toml::from_str(content)
            .map_err(|e| TemplateError::Schema(format!("unable to decode TOML: {}", e)))?;

        let mut arguments = Vec::with_capacity(raw.arguments.len());
        for (name, details) in raw.arguments {
            let details: RawArgument = details
                .try_into()
                .map_err(|e| TemplateError::Schema(format!("argument '{}': {}", name, e)))?;
            arguments.push(build_spec(name, details)?);
        }

        Ok(Self {
            description: raw
                .description
                .unwrap_or_else(|| DEFAULT_CLI_DESCRIPTION.to_string()),
            arguments,
        })
    }
}

fn build_spec(name: String, raw: RawArgument) -> Result<ArgumentSpec> {
    validate_name(&name)?;

    let arg_type = match raw.arg_type.as_deref() {
        Some(type_name) => type_name
            .parse::<ArgType>()
            .map_err(|e| TemplateError::Schema(format!("argument '{}': {}", name, e)))?,
        None => ArgType::Str,
    };

    let coerce = |value: &toml::Value, what: &str| {
        arg_type.coerce(value).ok_or_else(|| {
            TemplateError::Schema(format!(
                "argument '{}': {} {} is not a valid {}",
                name, what, value, arg_type
            ))
        })
    };

    let choices = raw
        .choices
        .unwrap_or_default()
        .iter()
        .map(|choice| coerce(choice, "choice"))
        .collect::<Result<Vec<_>>>()?;

    let default = raw
        .default
        .as_ref()
        .map(|value| coerce(value, "default"))
        .transpose()?;

    Ok(ArgumentSpec {
        name,
        arg_type,
        required: raw.required,
        choices,
        default,
        help: raw.help,
    })
}

/// Names clap reserves for its own flags
const RESERVED_NAMES: &[&str] = &["help"];

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TemplateError::Schema(
            "argument names must not be empty".to_string(),
        ));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(TemplateError::Schema(format!(
            "argument '{}' is reserved for the built-in --{} flag",
            name, name
        )));
    }
    if name.starts_with('-') || name.contains(|c: char| c == '=' || c.is_whitespace()) {
        return Err(TemplateError::Schema(format!(
            "argument '{}' cannot be used as a --flag name",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_schema() {
        let schema: CliSchema = r#"
description = "Example tool"

[arguments.count]
type = "int"
required = true
help = "How many"

[arguments.mode]
choices = ["fast", "slow"]
default = "fast"

[arguments.ratio]
type = "float"
default = 1
"#
        .parse()
        .unwrap();

        assert_eq!(schema.description, "Example tool");
        let names: Vec<_> = schema.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["count", "mode", "ratio"]);

        let count = schema.argument("count").unwrap();
        assert_eq!(count.arg_type, ArgType::Int);
        assert!(count.required);
        assert_eq!(count.help.as_deref(), Some("How many"));

        let mode = schema.argument("mode").unwrap();
        assert_eq!(mode.arg_type, ArgType::Str);
        assert_eq!(
            mode.choices,
            vec![ArgValue::Str("fast".into()), ArgValue::Str("slow".into())]
        );
        assert_eq!(mode.default, Some(ArgValue::Str("fast".into())));

        assert_eq!(
            schema.argument("ratio").unwrap().default,
            Some(ArgValue::Float(1.0))
        );
    }

    #[test]
    fn test_missing_description_uses_fallback() {
        let schema: CliSchema = "".parse().unwrap();
        assert_eq!(schema.description, DEFAULT_CLI_DESCRIPTION);
        assert!(schema.arguments.is_empty());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = "[arguments.x]\ntype = \"__import__('os')\""
            .parse::<CliSchema>()
            .unwrap_err();
        assert!(
            matches!(err, TemplateError::Schema(ref msg) if msg.contains("unknown argument type"))
        );
    }

    #[test]
    fn test_reserved_name_is_rejected() {
        let err = "[arguments.help]\ntype = \"str\""
            .parse::<CliSchema>()
            .unwrap_err();
        assert!(matches!(err, TemplateError::Schema(ref msg) if msg.contains("reserved")));

        for body in [
            "[arguments.\"\"]\ntype = \"str\"",
            "[arguments.\"-x\"]\ntype = \"str\"",
            "[arguments.\"a b\"]\ntype = \"str\"",
            "[arguments.\"a=b\"]\ntype = \"str\"",
        ] {
            assert!(matches!(
                body.parse::<CliSchema>(),
                Err(TemplateError::Schema(_))
            ));
        }
    }

    #[test]
    fn test_bad_default_is_rejected() {
        let err = "[arguments.n]\ntype = \"int\"\ndefault = \"many\""
            .parse::<CliSchema>()
            .unwrap_err();
        assert!(matches!(err, TemplateError::Schema(_)));
    }

    #[test]
    fn test_malformed_toml_is_schema_error() {
        let err = "arguments = [".parse::<CliSchema>().unwrap_err();
        assert!(matches!(err, TemplateError::Schema(_)));
    }

    #[test]
    fn test_convert() {
        assert_eq!(ArgType::Int.convert("5"), Ok(ArgValue::Int(5)));
        assert!(ArgType::Int.convert("five").is_err());
        assert_eq!(ArgType::Float.convert("2.5"), Ok(ArgValue::Float(2.5)));
        assert_eq!(ArgType::Bool.convert("no"), Ok(ArgValue::Bool(false)));
        assert_eq!(ArgType::Bool.convert("TRUE"), Ok(ArgValue::Bool(true)));
        assert!(ArgType::Bool.convert("maybe").is_err());
        assert_eq!(ArgType::Str.convert("x"), Ok(ArgValue::Str("x".into())));
    }
}
