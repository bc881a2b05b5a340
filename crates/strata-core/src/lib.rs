//! Dependency resolution core for Strata
//!
//! A plugin declares what it needs as a list of [`Requirement`]s. The
//! [`TreeBuilder`] expands those needs against a [`LayerRegistry`] into a
//! tree of candidate layer stacks, and the [`DependencyResolver`] walks the
//! tree against a live [`Context`], instantiating the first stack that
//! works.
//!
//! # Modules
//!
//! - [`registry`] - known layer types and their aggregated metadata
//! - [`matcher`] - constraint matching between layer types and requirements
//! - [`tree`] - requirement tree types
//! - [`builder`] - tree construction with pruning and cycle detection
//! - [`resolver`] - transactional resolution into live layers
//! - [`builtin`] - file-backed and Intel paged layer types

pub mod builder;
pub mod builtin;
pub mod configurable;
pub mod context;
pub mod error;
pub mod matcher;
pub mod metadata;
pub mod registry;
pub mod requirement;
pub mod resolver;
pub mod tree;

#[cfg(test)]
mod testing;

pub use builder::TreeBuilder;
pub use builtin::{FileLayerType, IntelLayerType};
pub use configurable::{Configurable, LayerType, LayerTypeRef, PluginSchema};
pub use context::{Checkpoint, Context};
pub use error::{Error, Result};
pub use metadata::{Metadata, MetadataValue, metadata};
pub use registry::{AggregatedMetadata, LayerRegistry};
pub use requirement::{Requirement, RequirementKind};
pub use resolver::DependencyResolver;
pub use tree::{Branch, RequirementTreeLeaf, RequirementTreeNode, TreeNode, TreeView};
