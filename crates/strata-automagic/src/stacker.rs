//! Automatic layer stacking from an image location

use crate::Result;
use strata_config::ConfigPath;
use strata_core::tree::leaf_paths;
use strata_core::{Configurable, Context, DependencyResolver, Error};

/// Requirement name under which physical layers take their image.
pub const LOCATION: &str = "location";

/// Stacks layers for a plugin given only the image to read.
///
/// Every `location` requirement anywhere in the plugin's tree that is not
/// already configured is pointed at the image, then the tree is resolved.
#[derive(Debug, Clone)]
pub struct LayerStacker {
    base: ConfigPath,
}

impl Default for LayerStacker {
    fn default() -> Self {
        Self {
            base: ConfigPath::new("plugins"),
        }
    }
}

impl LayerStacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure plugins beneath `base` instead of `plugins`.
    pub fn with_base(base: impl Into<ConfigPath>) -> Self {
        Self { base: base.into() }
    }

    /// Where `plugin`'s configuration lives.
    pub fn plugin_path(&self, plugin: &dyn Configurable) -> ConfigPath {
        self.base.join(plugin.name())
    }

    /// Seed `location` and resolve `plugin`'s requirements.
    ///
    /// Returns the names of the layers added to the context, lowest first.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unresolved` if no layer stack satisfies the plugin;
    /// the context is then left as it was.
    pub fn stack(
        &self,
        resolver: &DependencyResolver,
        plugin: &dyn Configurable,
        context: &mut Context,
        location: &str,
    ) -> Result<Vec<String>> {
        let path = self.plugin_path(plugin);
        let tree = resolver.build_tree(plugin);
        let start = context.checkpoint();

        let mut seeded = Vec::new();
        for leaf in leaf_paths(&tree, &path, LOCATION) {
            if !context.config.contains(&leaf) {
                tracing::debug!(path = %leaf, location, "Seeding image location");
                context.config.write(&leaf, location);
                seeded.push(leaf);
            }
        }

        let before = context.memory.len();
        if !resolver.validate_dependencies(&tree, context, &path) {
            context.rollback(start);
            return Err(Error::Unresolved {
                configurable: plugin.name().to_string(),
            }
            .into());
        }

        // Seeds under nodes the chosen stack never instantiated are unused
        for leaf in seeded {
            if !is_consumed(&leaf, &path, context) {
                tracing::debug!(path = %leaf, "Dropping unused image location");
                context.config.remove(&leaf);
            }
        }

        let added: Vec<String> = context.memory.names()[before..]
            .iter()
            .map(|name| name.to_string())
            .collect();
        tracing::info!(plugin = plugin.name(), layers = ?added, "Stacked layers");
        Ok(added)
    }
}

/// A seeded leaf is read by the plugin itself or by a layer built at its parent.
fn is_consumed(leaf: &ConfigPath, plugin_path: &ConfigPath, context: &Context) -> bool {
    leaf.parent().is_some_and(|owner| {
        owner == *plugin_path
            || context
                .config
                .get_str(&owner)
                .is_some_and(|name| context.memory.contains(name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_core::{PluginSchema, Requirement};
    use strata_test_utils::TestImage;

    fn imageinfo() -> PluginSchema {
        PluginSchema::new(
            "imageinfo",
            vec![Requirement::layer("primary").with_constraint("layer_kind", "physical")],
        )
    }

    #[test]
    fn test_stack_physical_layer() {
        let image = TestImage::new(&[0u8; 0x2000]);
        let resolver = DependencyResolver::with_builtins();
        let mut context = Context::new();

        let added = LayerStacker::new()
            .stack(&resolver, &imageinfo(), &mut context, &image.location())
            .unwrap();

        assert_eq!(added, vec!["primary".to_string()]);
        assert_eq!(context.config.get_str("plugins.imageinfo.primary"), Some("primary"));
        assert_eq!(
            context.config.get_str("plugins.imageinfo.primary.location"),
            Some(image.location().as_str())
        );
    }

    #[test]
    fn test_configured_location_is_kept() {
        let image = TestImage::new(&[0u8; 0x2000]);
        let resolver = DependencyResolver::with_builtins();
        let mut context = Context::new();
        context
            .config
            .write("plugins.imageinfo.primary.location", image.path().display().to_string());

        LayerStacker::new()
            .stack(&resolver, &imageinfo(), &mut context, "file:///does/not/exist")
            .unwrap();
        assert_eq!(context.memory.len(), 1);
    }

    #[test]
    fn test_unused_location_seeds_are_dropped() {
        let image = TestImage::new(&[0u8; 0x2000]);
        let resolver = DependencyResolver::with_builtins();
        let plugin = PluginSchema::new("layerinfo", vec![Requirement::layer("primary")]);
        let mut context = Context::new();

        let added = LayerStacker::new()
            .stack(&resolver, &plugin, &mut context, &image.location())
            .unwrap();

        // FileLayer wins, so nothing reads the Intel branch's memory_layer seed
        assert_eq!(added, vec!["primary".to_string()]);
        assert_eq!(
            context.config.get_str("plugins.layerinfo.primary.location"),
            Some(image.location().as_str())
        );
        assert!(!context.config.contains("plugins.layerinfo.primary.memory_layer.location"));
    }

    #[test]
    fn test_failure_restores_context() {
        let resolver = DependencyResolver::with_builtins();
        let mut context = Context::new();

        let err = LayerStacker::with_base("custom")
            .stack(&resolver, &imageinfo(), &mut context, "/does/not/exist.raw")
            .unwrap_err();

        assert!(matches!(err, crate::Error::Core(Error::Unresolved { .. })));
        assert!(context.config.is_empty());
        assert!(context.memory.is_empty());
    }
}
