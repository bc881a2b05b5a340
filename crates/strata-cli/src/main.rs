//! Strata CLI
//!
//! Inspect layer types and requirement trees, and assemble the layer stack
//! a plugin needs for a memory image.

mod cli;
mod commands;
mod error;
mod logging;
mod plugins;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use strata_core::DependencyResolver;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: could not set up logging: {e}", "warning".yellow().bold());
    }
    if cli.verbose {
        tracing::debug!("Verbose mode enabled");
    }

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "strata", &mut std::io::stdout());
        return Ok(());
    }

    let resolver = DependencyResolver::with_builtins();
    let plugins = plugins::load(cli.plugins.as_deref())?;

    match cli.command {
        Commands::Layers { json } => commands::run_layers(resolver.registry(), json),
        Commands::Tree { plugin, json } => {
            commands::run_tree(&resolver, plugins::find(&plugins, &plugin)?, json)
        }
        Commands::Resolve {
            plugin,
            image,
            config,
            set,
            save,
            json,
        } => commands::run_resolve(
            &resolver,
            plugins::find(&plugins, &plugin)?,
            &image,
            config.as_deref(),
            &set,
            save.as_deref(),
            json,
        ),
        Commands::Pdbscan { image, json } => commands::run_pdbscan(&image, json),
        Commands::Completions { .. } => Ok(()),
    }
}
