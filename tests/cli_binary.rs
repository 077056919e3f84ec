use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const SCHEMA: &str = r#"
description = "Counts things"

[arguments.count]
type = "int"
required = true
help = "How many"
"#;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_script-template"))
        .current_dir(dir)
        .env_remove("SCRIPT_TEMPLATE_CONFIG")
        .env("SCRIPT_TEMPLATE_CLI_CONFIG", dir.join("cli_config.toml"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_parses_typed_arguments() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("cli_config.toml"), SCHEMA).unwrap();

    let output = run(temp_dir.path(), &["--count", "5"]);
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed, serde_json::json!({"count": 5}));
    assert!(temp_dir.path().join("logs").join("template.log").exists());
}

#[test]
fn test_missing_required_flag_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("cli_config.toml"), SCHEMA).unwrap();

    let output = run(temp_dir.path(), &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--count"));
}

#[test]
fn test_missing_schema_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(temp_dir.path(), &["--count", "5"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cli_config.toml"));
}

#[test]
fn test_records_run_in_configured_cache() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("cli_config.toml"), SCHEMA).unwrap();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[cache]\npath = \"data/cache.json\"\n",
    )
    .unwrap();

    let output = run(temp_dir.path(), &["--count", "2"]);
    assert!(output.status.success());

    let store: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(temp_dir.path().join("data").join("cache.json")).unwrap(),
    )
    .unwrap();
    let record = &store["_default"][0];
    assert_eq!(record["name"], "last_run");
    assert_eq!(record["arguments"], serde_json::json!({"count": 2}));
}
