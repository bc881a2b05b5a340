//! Plugin schemas: built-in and loaded from TOML
//!
//! A plugin file lists plugins as an array of tables:
//!
//! ```toml
//! [[plugin]]
//! name = "pslist"
//! description = "List processes"
//!
//! [[plugin.requirements]]
//! name = "primary"
//! type = "layer"
//! constraints = { architecture = "intel" }
//!
//! [[plugin.requirements]]
//! name = "pid"
//! type = "integer"
//! optional = true
//! ```

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use strata_core::{PluginSchema, Requirement};

#[derive(Debug, Deserialize)]
struct PluginFile {
    #[serde(default, rename = "plugin")]
    plugins: Vec<PluginSchema>,
}

/// Plugins available without a plugin file.
pub fn builtin_plugins() -> Vec<PluginSchema> {
    vec![
        PluginSchema {
            name: "imageinfo".into(),
            description: "Open a memory image as a physical layer".into(),
            requirements: vec![
                Requirement::layer("primary")
                    .describe("Physical memory")
                    .with_constraint("layer_kind", "physical"),
            ],
        },
        PluginSchema {
            name: "kernelinfo".into(),
            description: "Translate kernel virtual memory through Intel page tables".into(),
            requirements: vec![
                Requirement::layer("primary")
                    .describe("Kernel virtual memory")
                    .with_constraint("architecture", "intel")
                    .with_constraint("layer_kind", "virtual"),
            ],
        },
    ]
}

/// Parse a plugin file.
pub fn parse(content: &str) -> Result<Vec<PluginSchema>> {
    let file: PluginFile = toml::from_str(content)?;
    for plugin in &file.plugins {
        plugin.validate()?;
    }
    Ok(file.plugins)
}

/// Plugins from `path`, if given, ahead of the built-in ones.
pub fn load(path: Option<&Path>) -> Result<Vec<PluginSchema>> {
    let mut plugins = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let loaded = parse(&content)?;
            tracing::debug!(path = %path.display(), plugins = loaded.len(), "Loaded plugin file");
            loaded
        }
        None => Vec::new(),
    };
    plugins.extend(builtin_plugins());
    Ok(plugins)
}

/// The first plugin called `name`.
pub fn find<'a>(plugins: &'a [PluginSchema], name: &str) -> Result<&'a PluginSchema> {
    plugins.iter().find(|p| p.name == name).ok_or_else(|| {
        let available: Vec<&str> = plugins.iter().map(|p| p.name.as_str()).collect();
        CliError::user(format!(
            "Unknown plugin '{name}'. Available: {}",
            available.join(", ")
        ))
    })
}
