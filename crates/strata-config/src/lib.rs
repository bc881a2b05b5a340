//! Hierarchical configuration store for Strata
//!
//! Configuration values live at dotted paths (`plugin.primary.location`).
//! Layers and the resolver read and write through [`HierarchicalConfig`];
//! [`ConfigFile`] moves a store to and from disk.

pub mod error;
pub mod file;
pub mod path;
pub mod store;

pub use error::{Error, Result};
pub use file::ConfigFile;
pub use path::{ConfigPath, SEPARATOR};
pub use store::{ConfigValue, HierarchicalConfig};
