//! Shared test utilities for the Strata workspace.
//!
//! Fixtures used across crate test suites. Dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`layer_types`] - [`MockLayerType`] with scripted metadata, schema and failures
//! - [`image`] - memory images with PDB signatures and page tables on disk

pub mod image;
pub mod layer_types;

pub use image::{SAMPLE_GUID, SAMPLE_GUID_HEX, TestImage, kernel_image, rsds_record};
pub use layer_types::{MockLayer, MockLayerType, plugin};
