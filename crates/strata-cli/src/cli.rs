//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Strata - Assemble memory layer stacks for forensic plugins
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML file declaring additional plugins
    #[arg(long, global = true, env = "STRATA_PLUGINS")]
    pub plugins: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List known layer types and their metadata
    Layers {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show the requirement tree of a plugin
    Tree {
        /// Plugin name
        plugin: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Build the layer stack a plugin needs for an image
    ///
    /// Examples:
    ///   strata resolve imageinfo --image memory.raw
    ///   strata resolve kernelinfo --image memory.raw \
    ///       --set plugins.kernelinfo.primary.page_map_offset=0x1aa000
    Resolve {
        /// Plugin name
        plugin: String,

        /// Memory image to read
        #[arg(short, long)]
        image: PathBuf,

        /// Configuration file (.toml, .json, .yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override a configuration value (KEY=VALUE, repeatable)
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Write the resolved configuration to this file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Scan an image for Windows kernel PDB signatures
    Pdbscan {
        /// Memory image to scan
        #[arg(short, long)]
        image: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   strata completions bash > ~/.local/share/bash-completion/completions/strata
    ///   strata completions zsh > ~/.zfunc/_strata
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
