//! Intel x86 paged layers
//!
//! - `Intel32` - 32-bit paging (2-level, 4-byte entries, 4 MiB large pages)
//! - `IntelPAE` - PAE paging (3-level, 8-byte entries, 2 MiB large pages)
//! - `Intel32e` - 4-level paging (48-bit, 2 MiB and 1 GiB large pages)

use crate::{Error, Layer, Memory, Result};

const PRESENT: u64 = 1;
const LARGE_PAGE: u64 = 1 << 7;

/// One level of a page-table walk.
#[derive(Debug, Clone, Copy)]
struct Level {
    /// Virtual address bits used to index this level's table.
    bits: u32,
    /// Whether an entry at this level may map a page directly.
    large_pages: bool,
}

const INTEL32_LEVELS: &[Level] = &[
    Level { bits: 10, large_pages: true },
    Level { bits: 10, large_pages: false },
];

const PAE_LEVELS: &[Level] = &[
    Level { bits: 2, large_pages: false },
    Level { bits: 9, large_pages: true },
    Level { bits: 9, large_pages: false },
];

const INTEL32E_LEVELS: &[Level] = &[
    Level { bits: 9, large_pages: false },
    Level { bits: 9, large_pages: true },
    Level { bits: 9, large_pages: true },
    Level { bits: 9, large_pages: false },
];

/// Paging structure layout of an Intel layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PagingMode {
    Intel32,
    Pae,
    Intel32e,
}

impl PagingMode {
    pub const ALL: [PagingMode; 3] = [PagingMode::Intel32, PagingMode::Pae, PagingMode::Intel32e];

    /// Layer type name for this mode.
    pub fn name(self) -> &'static str {
        match self {
            Self::Intel32 => "Intel32",
            Self::Pae => "IntelPAE",
            Self::Intel32e => "Intel32e",
        }
    }

    /// Short tag used in layer metadata.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Intel32 => "ia32",
            Self::Pae => "pae",
            Self::Intel32e => "ia32e",
        }
    }

    pub fn address_bits(self) -> u32 {
        match self {
            Self::Intel32 | Self::Pae => 32,
            Self::Intel32e => 48,
        }
    }

    fn entry_size(self) -> u64 {
        match self {
            Self::Intel32 => 4,
            Self::Pae | Self::Intel32e => 8,
        }
    }

    fn levels(self) -> &'static [Level] {
        match self {
            Self::Intel32 => INTEL32_LEVELS,
            Self::Pae => PAE_LEVELS,
            Self::Intel32e => INTEL32E_LEVELS,
        }
    }

    /// Physical address bits of an entry.
    fn entry_mask(self) -> u64 {
        match self {
            Self::Intel32 => 0xffff_f000,
            Self::Pae | Self::Intel32e => 0x000f_ffff_ffff_f000,
        }
    }

    /// Base of the top-level table for a given page map offset (CR3).
    fn table_base(self, page_map_offset: u64) -> u64 {
        match self {
            Self::Pae => page_map_offset & !0x1f,
            Self::Intel32 | Self::Intel32e => page_map_offset & !0xfff,
        }
    }
}

/// A virtual address space translated through page tables in a lower layer.
#[derive(Debug, Clone)]
pub struct IntelLayer {
    name: String,
    memory_layer: String,
    page_map_offset: u64,
    mode: PagingMode,
}

impl IntelLayer {
    pub fn new(
        name: impl Into<String>,
        memory_layer: impl Into<String>,
        page_map_offset: u64,
        mode: PagingMode,
    ) -> Self {
        Self {
            name: name.into(),
            memory_layer: memory_layer.into(),
            page_map_offset,
            mode,
        }
    }

    pub fn mode(&self) -> PagingMode {
        self.mode
    }

    pub fn page_map_offset(&self) -> u64 {
        self.page_map_offset
    }

    pub fn memory_layer(&self) -> &str {
        &self.memory_layer
    }

    fn read_entry(&self, memory: &Memory, address: u64, vaddr: u64) -> Result<u64> {
        let size = self.mode.entry_size() as usize;
        let bytes = match memory.read(&self.memory_layer, address, size) {
            Ok(bytes) => bytes,
            Err(Error::InvalidAddress { .. }) => {
                return Err(Error::invalid_address(&self.name, vaddr, 1));
            }
            Err(e) => return Err(e),
        };
        let mut raw = [0u8; 8];
        raw[..size].copy_from_slice(&bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Translate a virtual address to `(physical address, page size)`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidAddress` if the address is outside the address
    /// space or any entry on the walk is not present.
    pub fn translate(&self, memory: &Memory, vaddr: u64) -> Result<(u64, u64)> {
        if vaddr >= self.end_address() {
            return Err(Error::invalid_address(&self.name, vaddr, 1));
        }

        let levels = self.mode.levels();
        let mask = self.mode.entry_mask();
        let mut table = self.mode.table_base(self.page_map_offset);
        let mut shift = self.mode.address_bits();

        for (depth, level) in levels.iter().enumerate() {
            shift -= level.bits;
            let index = (vaddr >> shift) & ((1u64 << level.bits) - 1);
            let entry = self.read_entry(memory, table + index * self.mode.entry_size(), vaddr)?;
            if entry & PRESENT == 0 {
                return Err(Error::invalid_address(&self.name, vaddr, 1));
            }

            let last = depth + 1 == levels.len();
            if last || (level.large_pages && entry & LARGE_PAGE != 0) {
                let page_size = 1u64 << shift;
                let base = entry & mask & !(page_size - 1);
                return Ok((base | (vaddr & (page_size - 1)), page_size));
            }
            table = entry & mask;
        }

        Err(Error::invalid_address(&self.name, vaddr, 1))
    }

    /// Split `[offset, offset + length)` into physically contiguous pieces.
    fn mapping(&self, memory: &Memory, offset: u64, length: u64) -> Result<Vec<(u64, u64)>> {
        let mut pieces = Vec::new();
        let mut address = offset;
        let mut remaining = length;
        while remaining > 0 {
            let (physical, page_size) = self.translate(memory, address)?;
            let in_page = page_size - (address & (page_size - 1));
            let chunk = in_page.min(remaining);
            pieces.push((physical, chunk));
            address += chunk;
            remaining -= chunk;
        }
        Ok(pieces)
    }
}

impl Layer for IntelLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn end_address(&self) -> u64 {
        1u64 << self.mode.address_bits()
    }

    fn is_valid(&self, memory: &Memory, offset: u64, length: u64) -> bool {
        if offset.checked_add(length).is_none_or(|stop| stop > self.end_address()) {
            return false;
        }
        self.mapping(memory, offset, length).is_ok_and(|pieces| {
            pieces
                .iter()
                .all(|&(physical, chunk)| memory.is_valid(&self.memory_layer, physical, chunk))
        })
    }

    fn read(&self, memory: &Memory, offset: u64, length: usize) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(length);
        for (physical, chunk) in self.mapping(memory, offset, length as u64)? {
            match memory.read(&self.memory_layer, physical, chunk as usize) {
                Ok(bytes) => data.extend_from_slice(&bytes),
                Err(Error::InvalidAddress { .. }) => {
                    return Err(Error::invalid_address(&self.name, offset, length as u64));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(data)
    }

    fn dependencies(&self) -> Vec<String> {
        vec![self.memory_layer.clone()]
    }
}
