use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the script template helpers
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CLI schema error: {0}")]
    Schema(String),

    #[error("Cache store {} is corrupt: {source}", path.display())]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache store {} is closed", .0.display())]
    CacheClosed(PathBuf),

    #[error("Logging error: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
