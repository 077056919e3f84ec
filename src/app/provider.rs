use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::config::{load_config_from_toml, ConfigHandler};
use crate::utils::Result;

/// Shared handle to the loaded configuration.
///
/// Clones share the same handler, so swapping it through one clone is seen
/// by all of them.
#[derive(Debug, Clone)]
pub struct Provider {
    config_handler: Arc<RwLock<ConfigHandler>>,
    config_path: Option<PathBuf>,
}

impl Provider {
    /// Create a provider by loading the TOML file at `config_path`
    pub fn new(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();
        let handler = load_config_from_toml(config_path)?;
        Ok(Self {
            config_handler: Arc::new(RwLock::new(handler)),
            config_path: Some(config_path.to_path_buf()),
        })
    }

    /// Create a provider around an existing handler
    pub fn from_handler(handler: ConfigHandler) -> Self {
        let config_path = handler.source().map(Path::to_path_buf);
        Self {
            config_handler: Arc::new(RwLock::new(handler)),
            config_path,
        }
    }

    /// Snapshot of the current configuration handler
    pub fn config_handler(&self) -> ConfigHandler {
        self.config_handler.read().clone()
    }

    /// Replace the whole configuration
    pub fn set_config_handler(&self, handler: ConfigHandler) {
        *self.config_handler.write() = handler;
    }

    /// Re-read the file this provider was created from
    pub fn reload(&self) -> Result<()> {
        if let Some(path) = &self.config_path {
            let handler = load_config_from_toml(path)?;
            self.set_config_handler(handler);
        }
        Ok(())
    }

    /// Look up `key` in the current configuration
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.config_handler.read().get(key, default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn handler(body: &str) -> ConfigHandler {
        ConfigHandler::from_table(toml::from_str(body).unwrap()).unwrap()
    }

    #[test]
    fn test_swap_is_visible_to_clones() {
        let provider = Provider::from_handler(handler("mode = \"dev\""));
        let shared = provider.clone();

        assert_eq!(shared.get("mode", String::new()), "dev");

        provider.set_config_handler(handler("mode = \"prod\""));
        assert_eq!(shared.get("mode", String::new()), "prod");
        assert_eq!(
            shared.config_handler().get("mode", String::new()),
            "prod"
        );
    }

    #[test]
    fn test_new_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "level = 1\n").unwrap();

        let provider = Provider::new(&path).unwrap();
        assert_eq!(provider.get("level", 0i64), 1);

        std::fs::write(&path, "level = 2\n").unwrap();
        // Loaded once: the file change is not seen until reload
        assert_eq!(provider.get("level", 0i64), 1);

        provider.reload().unwrap();
        assert_eq!(provider.get("level", 0i64), 2);
    }

    #[test]
    fn test_new_with_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Provider::new(temp_dir.path().join("missing.toml")).is_err());
    }
}
