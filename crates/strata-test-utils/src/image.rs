//! Memory image fixtures.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// GUID bytes as stored in an RSDS record.
pub const SAMPLE_GUID: [u8; 16] = [
    0x78, 0x56, 0x34, 0x12, 0xbc, 0x9a, 0xf0, 0xde, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
];

/// [`SAMPLE_GUID`] as a PDB scanner renders it.
pub const SAMPLE_GUID_HEX: &str = "123456789ABCDEF00102030405060708";

/// An `RSDS` debug record: signature, GUID, little-endian age, NUL-terminated name.
pub fn rsds_record(guid: [u8; 16], age: u32, pdb_name: &str) -> Vec<u8> {
    let mut record = b"RSDS".to_vec();
    record.extend_from_slice(&guid);
    record.extend_from_slice(&age.to_le_bytes());
    record.extend_from_slice(pdb_name.as_bytes());
    record.push(0);
    record
}

/// A zeroed image of `size` bytes with an `MZ` header at `mz_offset` and a
/// [`SAMPLE_GUID`] record for `pdb_name` at `rsds_offset`.
pub fn kernel_image(size: usize, mz_offset: usize, rsds_offset: usize, pdb_name: &str) -> Vec<u8> {
    let mut image = vec![0u8; size];
    image[mz_offset..mz_offset + 2].copy_from_slice(b"MZ");
    let record = rsds_record(SAMPLE_GUID, 2, pdb_name);
    image[rsds_offset..rsds_offset + record.len()].copy_from_slice(&record);
    image
}

/// A memory image written to a temporary directory.
pub struct TestImage {
    temp_dir: TempDir,
    path: PathBuf,
}

impl TestImage {
    /// Write `bytes` to `memory.raw` in a fresh temporary directory.
    pub fn new(bytes: &[u8]) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("memory.raw");
        fs::write(&path, bytes).unwrap();
        Self { temp_dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory holding the image, for config files written beside it.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The image as a `file://` location.
    pub fn location(&self) -> String {
        format!("file://{}", self.path.display())
    }
}
