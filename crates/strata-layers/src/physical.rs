//! Physical layers: flat address spaces backed by a buffer or a file

use crate::{Error, Layer, Memory, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

fn in_bounds(offset: u64, length: u64, end: u64) -> bool {
    offset.checked_add(length).is_some_and(|stop| stop <= end)
}

/// A physical layer over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct BufferLayer {
    name: String,
    data: Vec<u8>,
}

impl BufferLayer {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

impl Layer for BufferLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn end_address(&self) -> u64 {
        self.data.len() as u64
    }

    fn is_valid(&self, _memory: &Memory, offset: u64, length: u64) -> bool {
        in_bounds(offset, length, self.end_address())
    }

    fn read(&self, _memory: &Memory, offset: u64, length: usize) -> Result<Vec<u8>> {
        if !in_bounds(offset, length as u64, self.end_address()) {
            return Err(Error::invalid_address(&self.name, offset, length as u64));
        }
        let start = offset as usize;
        Ok(self.data[start..start + length].to_vec())
    }
}

/// A physical layer over a raw image file.
///
/// The file stays open for the layer's lifetime; reads seek under a lock.
#[derive(Debug)]
pub struct FileLayer {
    name: String,
    path: PathBuf,
    size: u64,
    file: Mutex<File>,
}

impl FileLayer {
    /// Open the image at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be opened or inspected.
    pub fn open(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
        let size = file.metadata().map_err(|e| Error::io(&path, e))?.len();
        tracing::debug!(path = %path.display(), size, "Opened image file");
        Ok(Self {
            name: name.into(),
            path,
            size,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Layer for FileLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn end_address(&self) -> u64 {
        self.size
    }

    fn is_valid(&self, _memory: &Memory, offset: u64, length: u64) -> bool {
        in_bounds(offset, length, self.size)
    }

    fn read(&self, _memory: &Memory, offset: u64, length: usize) -> Result<Vec<u8>> {
        if !in_bounds(offset, length as u64, self.size) {
            return Err(Error::invalid_address(&self.name, offset, length as u64));
        }
        // A poisoned lock only means another reader panicked mid-read; the
        // handle itself is still usable because every read seeks first.
        let mut file = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut buffer = vec![0u8; length];
        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.read_exact(&mut buffer))
            .map_err(|e| Error::io(&self.path, e))?;
        Ok(buffer)
    }
}
