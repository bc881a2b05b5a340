//! Error types for strata-automagic

/// Result type for strata-automagic operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while stacking layers or scanning for PDBs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] strata_core::Error),

    #[error(transparent)]
    Layers(#[from] strata_layers::Error),

    #[error(transparent)]
    Config(#[from] strata_config::Error),
}
