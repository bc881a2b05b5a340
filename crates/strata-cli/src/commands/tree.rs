//! The `tree` command

use colored::Colorize;
use strata_core::tree::{render, view};
use strata_core::{DependencyResolver, PluginSchema};

use super::print_json;
use crate::error::Result;

/// Run the tree command
pub fn run_tree(resolver: &DependencyResolver, plugin: &PluginSchema, json: bool) -> Result<()> {
    let tree = resolver.build_tree(plugin);
    if json {
        return print_json(&view(&tree));
    }

    println!("{} {}", "Requirement tree for".bold(), plugin.name.green().bold());
    println!();
    print!("{}", render(&tree));
    Ok(())
}
