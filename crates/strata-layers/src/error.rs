//! Error types for strata-layers

use std::path::PathBuf;

/// Result type for strata-layers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or registering layers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid address in layer '{layer}': {length:#x} bytes at {offset:#x}")]
    InvalidAddress {
        layer: String,
        offset: u64,
        length: u64,
    },

    #[error("Layer not found: {name}")]
    LayerNotFound { name: String },

    #[error("Layer already registered: {name}")]
    DuplicateLayer { name: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scan pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_address(layer: &str, offset: u64, length: u64) -> Self {
        Self::InvalidAddress {
            layer: layer.to_string(),
            offset,
            length,
        }
    }
}
