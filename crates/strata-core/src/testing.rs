//! Layer type stubs for unit tests

use crate::{Configurable, Context, Error, LayerType, LayerTypeRef, Metadata, Requirement, Result};
use std::sync::Arc;
use strata_config::{ConfigPath, HierarchicalConfig};
use strata_layers::{BufferLayer, Layer};

#[derive(Debug, Clone)]
pub(crate) struct StubType {
    name: String,
    metadata: Metadata,
    schema: Vec<Requirement>,
    fails: bool,
    conflicts_with: Option<String>,
}

impl StubType {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            metadata: Metadata::new(),
            schema: Vec::new(),
            fails: false,
            conflicts_with: None,
        }
    }

    pub(crate) fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub(crate) fn with_schema(mut self, schema: Vec<Requirement>) -> Self {
        self.schema = schema;
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fails = true;
        self
    }

    /// Refuse to construct while a layer called `layer` exists.
    pub(crate) fn conflicting_with(mut self, layer: &str) -> Self {
        self.conflicts_with = Some(layer.to_string());
        self
    }

    pub(crate) fn into_ref(self) -> LayerTypeRef {
        Arc::new(self)
    }
}

impl Configurable for StubType {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> Vec<Requirement> {
        self.schema.clone()
    }
}

impl LayerType for StubType {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn construct(
        &self,
        context: &Context,
        _config_path: &ConfigPath,
        name: &str,
        _params: &HierarchicalConfig,
    ) -> Result<Box<dyn Layer>> {
        if self.fails {
            return Err(Error::construction(&self.name, name, "stub failure"));
        }
        if let Some(conflict) = &self.conflicts_with {
            if context.memory.contains(conflict) {
                return Err(Error::construction(&self.name, name, format!("conflicts with {conflict}")));
            }
        }
        Ok(Box::new(BufferLayer::new(name, vec![0; 0x10])))
    }
}
