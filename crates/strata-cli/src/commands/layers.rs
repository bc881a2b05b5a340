//! The `layers` command

use colored::Colorize;
use serde::Serialize;
use strata_core::{AggregatedMetadata, LayerRegistry, Metadata, MetadataValue, Requirement};

use super::print_json;
use crate::error::Result;

#[derive(Serialize)]
struct LayerTypeInfo<'a> {
    name: &'a str,
    metadata: &'a Metadata,
    requirements: Vec<Requirement>,
}

#[derive(Serialize)]
struct LayersReport<'a> {
    layer_types: Vec<LayerTypeInfo<'a>>,
    aggregated_metadata: &'a AggregatedMetadata,
}

fn describe(value: &MetadataValue) -> String {
    match value {
        MetadataValue::One(value) => value.clone(),
        MetadataValue::Many(values) => format!("[{}]", values.join(", ")),
    }
}

/// Run the layers command
pub fn run_layers(registry: &LayerRegistry, json: bool) -> Result<()> {
    if json {
        let report = LayersReport {
            layer_types: registry
                .layer_types()
                .iter()
                .map(|layer_type| LayerTypeInfo {
                    name: layer_type.name(),
                    metadata: layer_type.metadata(),
                    requirements: layer_type.schema(),
                })
                .collect(),
            aggregated_metadata: registry.aggregated_metadata(),
        };
        return print_json(&report);
    }

    println!("{}", "Layer Types".bold());
    println!();
    for layer_type in registry.layer_types() {
        println!("  {}", layer_type.name().green().bold());
        for (key, value) in layer_type.metadata() {
            println!("    {:<14} {}", key.cyan(), describe(value));
        }
        for requirement in layer_type.schema() {
            println!(
                "    {} {} [{}]",
                "requires".dimmed(),
                requirement.name,
                requirement.kind_name()
            );
        }
    }

    println!();
    println!("{}", "Aggregated Metadata".bold());
    for (key, values) in registry.aggregated_metadata() {
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        println!("  {:<14} {}", key.cyan(), values.join(", "));
    }
    Ok(())
}
