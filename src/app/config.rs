use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::Value,
    Figment,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::ENV_PREFIX;
use crate::utils::{Result, TemplateError};

/// Parsed configuration mapping.
///
/// The TOML file is read exactly once; lookups afterwards only touch the
/// in-memory tree. Keys may be dotted (`database.url`) to reach nested
/// tables.
#[derive(Debug, Clone)]
pub struct ConfigHandler {
    root: Value,
    source: Option<PathBuf>,
}

impl ConfigHandler {
    /// Build a handler from an already parsed TOML table
    pub fn from_table(table: toml::Table) -> Result<Self> {
        let root = Figment::from(Serialized::defaults(table))
            .extract::<Value>()
            .map_err(|e| TemplateError::Config(e.to_string()))?;
        Ok(Self { root, source: None })
    }

    /// Look up `key`, falling back to `default` when absent or of another type
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_opt(key).unwrap_or(default)
    }

    /// Look up `key`, returning `None` when absent or of another type
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.root.find_ref(key)?.deserialize().ok()
    }

    /// Whether a value exists at `key`
    pub fn contains(&self, key: &str) -> bool {
        self.root.find_ref(key).is_some()
    }

    /// File this configuration was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Load configuration from a TOML file.
///
/// Environment variables prefixed with `SCRIPT_TEMPLATE_` are layered on top;
/// `__` separates nesting levels (`SCRIPT_TEMPLATE_DATABASE__URL`).
pub fn load_config_from_toml(config_path: impl AsRef<Path>) -> Result<ConfigHandler> {
    let config_path = config_path.as_ref();
    if !config_path.is_file() {
        return Err(TemplateError::Config(format!(
            "config file '{}' not found",
            config_path.display()
        )));
    }

    let figment = Figment::new()
        .merge(Toml::file_exact(config_path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["CONFIG", "CLI_CONFIG"])
                .split("__"),
        );

    let root = figment.extract::<Value>().map_err(|e| {
        TemplateError::Config(format!(
            "unable to decode TOML in '{}': {}",
            config_path.display(),
            e
        ))
    })?;

    debug!("Loaded configuration from {}", config_path.display());

    Ok(ConfigHandler {
        root,
        source: Some(config_path.to_path_buf()),
    })
}
