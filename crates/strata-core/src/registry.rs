//! Registry of known layer types
//!
//! The registry is built once, owned by the resolver, and never mutated
//! afterwards. Its order is the priority order of tree branches.

use crate::{LayerTypeRef, builtin};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Aggregated metadata: every value any registered type carries per key.
pub type AggregatedMetadata = BTreeMap<String, BTreeSet<String>>;

/// Ordered, deduplicated set of layer types.
///
/// # Example
///
/// ```
/// use strata_core::LayerRegistry;
///
/// let registry = LayerRegistry::with_builtins();
/// assert_eq!(registry.names(), vec!["FileLayer", "Intel32", "IntelPAE", "Intel32e"]);
/// assert!(registry.aggregated_metadata()["architecture"].contains("intel"));
/// ```
#[derive(Clone, Default)]
pub struct LayerRegistry {
    types: Vec<LayerTypeRef>,
    metadata: AggregatedMetadata,
}

impl LayerRegistry {
    /// Create a registry from layer types in priority order.
    ///
    /// Only the first type with a given name is kept.
    pub fn new(types: impl IntoIterator<Item = LayerTypeRef>) -> Self {
        let mut seen = HashSet::new();
        let mut registry = Self::default();

        for layer_type in types {
            if !seen.insert(layer_type.name().to_string()) {
                tracing::debug!(layer_type = layer_type.name(), "Skipping duplicate layer type");
                continue;
            }
            for (key, value) in layer_type.metadata() {
                registry
                    .metadata
                    .entry(key.clone())
                    .or_default()
                    .extend(value.values().map(String::from));
            }
            registry.types.push(layer_type);
        }

        tracing::debug!(types = registry.types.len(), "Built layer registry");
        registry
    }

    /// Create a registry holding the built-in layer types.
    ///
    /// In priority order: `FileLayer`, `Intel32`, `IntelPAE`, `Intel32e`.
    pub fn with_builtins() -> Self {
        Self::new(builtin::layer_types())
    }

    pub fn layer_types(&self) -> &[LayerTypeRef] {
        &self.types
    }

    pub fn aggregated_metadata(&self) -> &AggregatedMetadata {
        &self.metadata
    }

    /// Look up a layer type by name.
    pub fn get(&self, name: &str) -> Option<&LayerTypeRef> {
        self.types.iter().find(|layer_type| layer_type.name() == name)
    }

    /// Type names in priority order.
    pub fn names(&self) -> Vec<&str> {
        self.types.iter().map(|layer_type| layer_type.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerRegistry")
            .field("types", &self.names())
            .field("metadata", &self.metadata)
            .finish()
    }
}
