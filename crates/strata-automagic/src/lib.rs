//! Automatic configuration for Strata
//!
//! Helpers that fill in what a user would otherwise configure by hand:
//! [`LayerStacker`] seeds an image location and resolves a plugin's layer
//! stack, and [`pdbscan`] locates Windows kernel debug records in a layer.
//! Results are heuristic; callers should let users override them.

pub mod error;
pub mod pdbscan;
pub mod stacker;

pub use error::{Error, Result};
pub use pdbscan::{KernelPdb, PdbSignature, PdbSignatureScanner};
pub use stacker::LayerStacker;
