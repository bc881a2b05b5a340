//! Built-in layer types
//!
//! `FileLayer` opens a raw image; `Intel32`, `IntelPAE` and `Intel32e`
//! translate through page tables held in a lower, non-Intel layer.

use crate::{Configurable, Context, Error, LayerType, LayerTypeRef, Metadata, MetadataValue, Requirement, Result, metadata};
use std::path::Path;
use std::sync::Arc;
use strata_config::{ConfigPath, HierarchicalConfig};
use strata_layers::{FileLayer, IntelLayer, Layer, PagingMode};

/// Built-in layer types in priority order.
pub fn layer_types() -> Vec<LayerTypeRef> {
    let mut types: Vec<LayerTypeRef> = vec![Arc::new(FileLayerType::new())];
    types.extend(
        PagingMode::ALL
            .into_iter()
            .map(|mode| Arc::new(IntelLayerType::new(mode)) as LayerTypeRef),
    );
    types
}

/// Strip an optional `file://` scheme from an image location.
fn location_path(location: &str) -> &Path {
    Path::new(location.strip_prefix("file://").unwrap_or(location))
}

/// A physical layer read from an image file.
#[derive(Debug, Clone)]
pub struct FileLayerType {
    metadata: Metadata,
}

impl FileLayerType {
    pub fn new() -> Self {
        Self {
            metadata: metadata([("layer_kind", "physical")]),
        }
    }
}

impl Default for FileLayerType {
    fn default() -> Self {
        Self::new()
    }
}

impl Configurable for FileLayerType {
    fn name(&self) -> &str {
        "FileLayer"
    }

    fn schema(&self) -> Vec<Requirement> {
        vec![Requirement::string("location").describe("Path or file:// URL of the memory image")]
    }
}

impl LayerType for FileLayerType {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn construct(
        &self,
        _context: &Context,
        _config_path: &ConfigPath,
        name: &str,
        params: &HierarchicalConfig,
    ) -> Result<Box<dyn Layer>> {
        let location = params.read_str("location")?;
        let layer = FileLayer::open(name, location_path(location))
            .map_err(|e| Error::construction(self.name(), name, e))?;
        Ok(Box::new(layer))
    }
}

/// An Intel paged virtual layer.
#[derive(Debug, Clone)]
pub struct IntelLayerType {
    mode: PagingMode,
    metadata: Metadata,
}

impl IntelLayerType {
    pub fn new(mode: PagingMode) -> Self {
        Self {
            mode,
            metadata: metadata([
                ("architecture", "intel"),
                ("layer_kind", "virtual"),
                ("paging", mode.tag()),
            ]),
        }
    }

    pub fn mode(&self) -> PagingMode {
        self.mode
    }
}

impl Configurable for IntelLayerType {
    fn name(&self) -> &str {
        self.mode.name()
    }

    fn schema(&self) -> Vec<Requirement> {
        vec![
            Requirement::layer("memory_layer")
                .describe("Layer holding the page tables")
                .with_constraint("architecture", MetadataValue::from(["intel"])),
            Requirement::integer("page_map_offset").describe("Physical address of the top-level page table"),
        ]
    }
}

impl LayerType for IntelLayerType {
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
        let memory_layer = params.read_str("memory_layer")?;
        let page_map_offset = params.read_u64("page_map_offset")?;
        context.memory.layer(memory_layer)?;

        tracing::debug!(layer = name, memory_layer, page_map_offset, mode = self.mode.name(), "Constructing Intel layer");
        Ok(Box::new(IntelLayer::new(name, memory_layer, page_map_offset, self.mode)))
    }
}
