//! The `pdbscan` command

use colored::Colorize;
use std::path::Path;
use strata_automagic::pdbscan;
use strata_layers::{FileLayer, Memory};

use super::print_json;
use crate::error::{CliError, Result};

const LAYER_NAME: &str = "memory_layer";

/// Run the pdbscan command
pub fn run_pdbscan(image: &Path, json: bool) -> Result<()> {
    if !image.is_file() {
        return Err(CliError::user(format!("Image not found: {}", image.display())));
    }

    let mut memory = Memory::new();
    memory.add_layer(Box::new(FileLayer::open(LAYER_NAME, image)?))?;
    let results = pdbscan::scan(&memory, LAYER_NAME)?;

    if json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("{}", "No kernel PDB signatures found".yellow());
        return Ok(());
    }

    println!("{}", "Kernel PDB Signatures".bold());
    println!();
    for result in &results {
        let signature = &result.signature;
        let mz = result
            .mz_offset
            .map_or_else(|| "-".to_string(), |offset| format!("{offset:#x}"));
        println!(
            "  {} {} age {} at {:#x} (MZ {})",
            signature.pdb_name.green(),
            signature.guid.cyan(),
            signature.age,
            signature.signature_offset,
            mz
        );
    }
    Ok(())
}
