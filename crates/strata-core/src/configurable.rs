//! Components that declare requirements, and the layer types among them

use crate::{Context, Error, Metadata, Requirement, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strata_config::{ConfigPath, HierarchicalConfig};
use strata_layers::Layer;

/// Anything that declares an ordered list of requirements.
pub trait Configurable: Send + Sync {
    fn name(&self) -> &str;

    /// Requirements in declaration order.
    fn schema(&self) -> Vec<Requirement>;
}

/// A kind of layer that can be instantiated into the memory namespace.
///
/// The type's name is its identity: a registry holds at most one type per
/// name and tree branches are keyed by it.
pub trait LayerType: Configurable {
    /// Declarative attributes matched against requirement constraints.
    fn metadata(&self) -> &Metadata;

    /// Build a layer called `name` from the resolved settings in `params`.
    ///
    /// `params` holds the configuration beneath `config_path`, re-rooted so
    /// requirement names address it directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are missing or invalid, or if the
    /// layer cannot be opened.
    fn construct(
        &self,
        context: &Context,
        config_path: &ConfigPath,
        name: &str,
        params: &HierarchicalConfig,
    ) -> Result<Box<dyn Layer>>;
}

/// Shared handle to a layer type.
pub type LayerTypeRef = Arc<dyn LayerType>;

/// A plugin declared as data, e.g. loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

impl PluginSchema {
    pub fn new(name: impl Into<String>, requirements: Vec<Requirement>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            requirements,
        }
    }

    /// Check that the plugin and requirement names are usable as single
    /// configuration path components.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` naming the first empty or dotted name.
    pub fn validate(&self) -> Result<()> {
        let names = std::iter::once(&self.name).chain(self.requirements.iter().map(|r| &r.name));
        for name in names {
            if name.is_empty() || name.contains(strata_config::SEPARATOR) {
                return Err(Error::validation(
                    name,
                    format!("'{name}' in plugin '{}' must be a non-empty name without '.'", self.name),
                ));
            }
        }
        Ok(())
    }
}

impl Configurable for PluginSchema {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> Vec<Requirement> {
        self.requirements.clone()
    }
}
