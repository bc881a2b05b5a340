//! Command implementations

pub mod layers;
pub mod pdbscan;
pub mod resolve;
pub mod tree;

pub use layers::run_layers;
pub use pdbscan::run_pdbscan;
pub use resolve::run_resolve;
pub use tree::run_tree;

use crate::error::Result;
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
