//! Error types for strata-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from strata-core
    #[error(transparent)]
    Core(#[from] strata_core::Error),

    /// Error from strata-automagic
    #[error(transparent)]
    Automagic(#[from] strata_automagic::Error),

    /// Error from strata-config
    #[error(transparent)]
    Config(#[from] strata_config::Error),

    /// Error from strata-layers
    #[error(transparent)]
    Layers(#[from] strata_layers::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Invalid plugin definitions
    #[error("Invalid plugin file: {0}")]
    Plugins(#[from] toml::de::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
