//! [`MockLayerType`] for resolver scenarios.

use std::sync::{Arc, Mutex};
use strata_config::{ConfigPath, HierarchicalConfig};
use strata_core::{
    Configurable, Context, Error, LayerType, LayerTypeRef, Metadata, MetadataValue, PluginSchema,
    Requirement, Result,
};
use strata_layers::{Layer, Memory};

/// Build a plugin schema from requirements.
pub fn plugin(name: &str, requirements: Vec<Requirement>) -> PluginSchema {
    PluginSchema::new(name, requirements)
}

/// A zero-filled layer that depends on the layers it was stacked on.
#[derive(Debug, Clone)]
pub struct MockLayer {
    name: String,
    size: u64,
    dependencies: Vec<String>,
}

impl Layer for MockLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn end_address(&self) -> u64 {
        self.size
    }

    fn is_valid(&self, _memory: &Memory, offset: u64, length: u64) -> bool {
        offset.checked_add(length).is_some_and(|end| end <= self.size)
    }

    fn read(&self, memory: &Memory, offset: u64, length: usize) -> strata_layers::Result<Vec<u8>> {
        if !self.is_valid(memory, offset, length as u64) {
            return Err(strata_layers::Error::invalid_address(&self.name, offset, length as u64));
        }
        Ok(vec![0; length])
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }
}

/// A layer type whose metadata, schema and construction outcome are scripted.
///
/// Clones share one construction log, so a test can keep a handle after
/// moving the type into a registry.
///
/// # Example
///
/// ```
/// use strata_core::Requirement;
/// use strata_test_utils::MockLayerType;
///
/// let paged = MockLayerType::new("Paged")
///     .with_metadata("layer_kind", "virtual")
///     .with_requirement(Requirement::layer("memory_layer"));
/// assert!(paged.constructed().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct MockLayerType {
    name: String,
    metadata: Metadata,
    schema: Vec<Requirement>,
    failure: Option<String>,
    conflicts_with: Option<String>,
    log: Arc<Mutex<Vec<String>>>,
}

impl MockLayerType {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            metadata: Metadata::new(),
            schema: Vec::new(),
            failure: None,
            conflicts_with: None,
            log: Arc::default(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.schema.push(requirement);
        self
    }

    /// Always fail construction with `reason`.
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    /// Fail construction while a layer named `layer` is live.
    pub fn conflicting_with(mut self, layer: &str) -> Self {
        self.conflicts_with = Some(layer.to_string());
        self
    }

    pub fn into_ref(self) -> LayerTypeRef {
        Arc::new(self)
    }

    /// Instance names of every construction attempt, successful or not.
    pub fn constructed(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

impl Configurable for MockLayerType {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> Vec<Requirement> {
        self.schema.clone()
    }
}

impl LayerType for MockLayerType {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn construct(
        &self,
        context: &Context,
        _config_path: &ConfigPath,
        name: &str,
        params: &HierarchicalConfig,
    ) -> Result<Box<dyn Layer>> {
        if let Ok(mut log) = self.log.lock() {
            log.push(name.to_string());
        }

        if let Some(reason) = &self.failure {
            return Err(Error::construction(&self.name, name, reason));
        }
        if let Some(conflict) = self.conflicts_with.as_deref().filter(|c| context.memory.contains(c)) {
            return Err(Error::construction(&self.name, name, format!("conflicts with {conflict}")));
        }

        let dependencies = self
            .schema
            .iter()
            .filter(|requirement| requirement.is_layer())
            .filter_map(|requirement| params.get_str(requirement.name.as_str()))
            .map(str::to_string)
            .collect();

        Ok(Box::new(MockLayer {
            name: name.to_string(),
            size: 0x1000,
            dependencies,
        }))
    }
}
