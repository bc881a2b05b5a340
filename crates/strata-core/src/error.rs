//! Error types for strata-core

/// Result type for strata-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or resolving requirement trees
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Requirement '{requirement}' not satisfied: {reason}")]
    Validation { requirement: String, reason: String },

    #[error("Failed to construct {layer_type} layer '{name}': {reason}")]
    Construction {
        layer_type: String,
        name: String,
        reason: String,
    },

    #[error("Could not resolve the requirements of '{configurable}'")]
    Unresolved { configurable: String },

    #[error(transparent)]
    Config(#[from] strata_config::Error),

    #[error(transparent)]
    Layers(#[from] strata_layers::Error),
}

impl Error {
    pub fn validation(requirement: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            requirement: requirement.to_string(),
            reason: reason.into(),
        }
    }

    pub fn construction(layer_type: &str, name: &str, reason: impl std::fmt::Display) -> Self {
        Self::Construction {
            layer_type: layer_type.to_string(),
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
