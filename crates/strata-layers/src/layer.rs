//! The Layer trait

use crate::{Memory, Result};

/// An addressable view over memory.
///
/// Layers that translate through another layer look it up by name in the
/// [`Memory`] namespace they are read through, so every read takes the
/// namespace as an argument.
pub trait Layer: std::fmt::Debug + Send + Sync {
    /// Instance name under which the layer is registered.
    fn name(&self) -> &str;

    /// Lowest valid address.
    fn minimum_address(&self) -> u64 {
        0
    }

    /// One past the highest address of the layer's address space.
    fn end_address(&self) -> u64;

    /// Whether every byte of `[offset, offset + length)` can be read.
    fn is_valid(&self, memory: &Memory, offset: u64, length: u64) -> bool;

    /// Read `length` bytes at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidAddress` if any byte of the range is unmapped.
    fn read(&self, memory: &Memory, offset: u64, length: usize) -> Result<Vec<u8>>;

    /// Names of the layers this layer reads through.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }
}
