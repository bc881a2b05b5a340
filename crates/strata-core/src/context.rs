//! Runtime context: configuration plus live layers

use strata_config::HierarchicalConfig;
use strata_layers::Memory;

/// The state a resolution reads and mutates.
#[derive(Debug, Default)]
pub struct Context {
    pub config: HierarchicalConfig,
    pub memory: Memory,
}

/// Snapshot taken before a speculative change to a [`Context`].
#[derive(Debug, Clone)]
pub struct Checkpoint {
    config: HierarchicalConfig,
    layers: usize,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HierarchicalConfig) -> Self {
        Self {
            config,
            memory: Memory::new(),
        }
    }

    /// Record the current configuration and memory size.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            config: self.config.clone(),
            layers: self.memory.len(),
        }
    }

    /// Undo everything done since `checkpoint`.
    ///
    /// Layers are only ever appended during resolution, so dropping those
    /// past the recorded length restores the namespace.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        let dropped = self.memory.len().saturating_sub(checkpoint.layers);
        if dropped > 0 {
            tracing::debug!(dropped, "Rolling back layers");
        }
        self.memory.truncate(checkpoint.layers);
        self.config = checkpoint.config;
    }
}
