//! The `resolve` command

use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use strata_automagic::LayerStacker;
use strata_config::{ConfigFile, ConfigPath, ConfigValue, HierarchicalConfig};
use strata_core::{Context, DependencyResolver, PluginSchema};

use super::print_json;
use crate::error::{CliError, Result};

#[derive(Serialize)]
struct ResolveReport<'a> {
    plugin: &'a str,
    layers: Vec<String>,
    config: &'a HierarchicalConfig,
}

/// Parse a `--set` value: `0x` hex, then JSON, then a plain string.
fn parse_value(raw: &str) -> ConfigValue {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        if let Ok(number) = u64::from_str_radix(hex, 16) {
            return number.into();
        }
    }
    serde_json::from_str(raw).unwrap_or_else(|_| ConfigValue::String(raw.to_string()))
}

/// Split `KEY=VALUE`.
pub fn parse_assignment(assignment: &str) -> Result<(ConfigPath, ConfigValue)> {
    let (key, value) = assignment
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| CliError::user(format!("Expected KEY=VALUE, got '{assignment}'")))?;
    Ok((ConfigPath::new(key.trim()), parse_value(value)))
}

/// Run the resolve command
pub fn run_resolve(
    resolver: &DependencyResolver,
    plugin: &PluginSchema,
    image: &Path,
    config: Option<&Path>,
    set: &[String],
    save: Option<&Path>,
    json: bool,
) -> Result<()> {
    if !image.is_file() {
        return Err(CliError::user(format!("Image not found: {}", image.display())));
    }

    let mut settings = match config {
        Some(path) => ConfigFile::load(path)?,
        None => HierarchicalConfig::new(),
    };
    for assignment in set {
        let (path, value) = parse_assignment(assignment)?;
        settings.write(path, value);
    }

    let mut context = Context::with_config(settings);
    let stacker = LayerStacker::new();
    let layers = stacker.stack(resolver, plugin, &mut context, &image.display().to_string())?;

    if let Some(path) = save {
        ConfigFile::save(path, &context.config)?;
        tracing::info!(path = %path.display(), "Saved configuration");
    }

    if json {
        return print_json(&ResolveReport {
            plugin: &plugin.name,
            layers,
            config: &context.config,
        });
    }

    println!("{} {}", "Resolved".green().bold(), plugin.name.bold());
    for layer in &layers {
        println!("  {} {}", "+".green(), layer);
    }
    println!();
    println!("{}", "Configuration".bold());
    let prefix = stacker.plugin_path(plugin);
    for (path, value) in context.config.iter().filter(|(path, _)| path.starts_with(&prefix)) {
        println!("  {} = {}", path.to_string().cyan(), value);
    }
    if let Some(path) = save {
        println!();
        println!("Saved to {}", path.display().to_string().cyan());
    }
    Ok(())
}
