//! Error types for strata-config

use std::path::PathBuf;

/// Result type for strata-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in strata-config operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No configuration value at '{path}'")]
    KeyNotFound { path: String },

    #[error("Configuration value at '{path}' is not a {expected}")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
