//! The memory namespace: live layers by instance name

use crate::{Error, Layer, PAGE_SIZE, Result, ScanHit, Scanner};
use indexmap::IndexMap;

/// Insertion-ordered namespace of live layers.
///
/// Names are unique. A layer can only be added once every layer it reads
/// through is already present, so dependencies always precede dependents.
#[derive(Debug, Default)]
pub struct Memory {
    layers: IndexMap<String, Box<dyn Layer>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer under its own name.
    ///
    /// # Errors
    ///
    /// - `Error::DuplicateLayer` if the name is taken
    /// - `Error::LayerNotFound` if one of its dependencies is missing
    pub fn add_layer(&mut self, layer: Box<dyn Layer>) -> Result<()> {
        let name = layer.name().to_string();
        if self.layers.contains_key(&name) {
            return Err(Error::DuplicateLayer { name });
        }
        if let Some(missing) = layer
            .dependencies()
            .into_iter()
            .find(|dependency| !self.layers.contains_key(dependency))
        {
            return Err(Error::LayerNotFound { name: missing });
        }
        tracing::debug!(layer = %name, "Registered layer");
        self.layers.insert(name, layer);
        Ok(())
    }

    /// Drop every layer registered after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.layers.truncate(len);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Layer> {
        self.layers.get(name).map(|layer| layer.as_ref())
    }

    /// Look up a layer, failing with `Error::LayerNotFound`.
    pub fn layer(&self, name: &str) -> Result<&dyn Layer> {
        self.get(name).ok_or_else(|| Error::LayerNotFound {
            name: name.to_string(),
        })
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.layers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// First unused name in the sequence `base`, `base2`, `base3`, ...
    pub fn free_layer_name(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        (2..)
            .map(|counter| format!("{base}{counter}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn read(&self, name: &str, offset: u64, length: usize) -> Result<Vec<u8>> {
        self.layer(name)?.read(self, offset, length)
    }

    pub fn is_valid(&self, name: &str, offset: u64, length: u64) -> bool {
        self.get(name)
            .is_some_and(|layer| layer.is_valid(self, offset, length))
    }

    /// Read a range, substituting zeros for unmapped pages.
    pub fn read_padded(&self, name: &str, offset: u64, length: usize) -> Result<Vec<u8>> {
        let layer = self.layer(name)?;
        match layer.read(self, offset, length) {
            Err(Error::InvalidAddress { .. }) => {}
            other => return other,
        }

        let mut data = Vec::with_capacity(length);
        let end = offset.saturating_add(length as u64);
        let mut position = offset;
        while position < end {
            let page_end = ((position / PAGE_SIZE) + 1).saturating_mul(PAGE_SIZE).min(end);
            let piece = (page_end - position) as usize;
            match layer.read(self, position, piece) {
                Ok(bytes) => data.extend_from_slice(&bytes),
                Err(Error::InvalidAddress { .. }) => data.resize(data.len() + piece, 0),
                Err(e) => return Err(e),
            }
            position = page_end;
        }
        Ok(data)
    }

    /// Run `scanner` across the whole address space of layer `name`.
    ///
    /// Windows of `chunk_size + overlap` bytes are read every `chunk_size`
    /// bytes. A hit belongs to the window whose non-overlapping part holds
    /// its offset, so a pattern straddling a window boundary is reported
    /// exactly once. Each window is searched from the [`end`](ScanHit::end)
    /// of the last hit kept, so a hit never starts inside the previous one.
    pub fn scan<S: Scanner>(&self, name: &str, scanner: &mut S) -> Result<Vec<S::Match>> {
        let layer = self.layer(name)?;
        let end = layer.end_address();
        let chunk = scanner.chunk_size().max(1);
        let overlap = scanner.overlap();

        let mut hits: Vec<S::Match> = Vec::new();
        let mut offset = layer.minimum_address();
        while offset < end {
            let window_end = offset.saturating_add(chunk).min(end);
            let start = hits.last().map_or(offset, |hit| hit.end().max(offset));
            if start < window_end {
                let read_end = window_end.saturating_add(overlap).min(end);
                let data = self.read_padded(name, start, (read_end - start) as usize)?;
                hits.extend(
                    scanner
                        .scan(&data, start)
                        .into_iter()
                        .filter(|hit| hit.offset() < window_end),
                );
            }
            offset = window_end;
        }
        tracing::debug!(layer = %name, hits = hits.len(), "Scan complete");
        Ok(hits)
    }
}
