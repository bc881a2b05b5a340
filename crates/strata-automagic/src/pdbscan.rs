//! Windows kernel PDB signature discovery
//!
//! Kernel images embed an `RSDS` CodeView record naming the PDB that
//! describes them. Finding that record, and the `MZ` header of the image it
//! belongs to, identifies which symbol tables a memory image needs.

use crate::Result;
use serde::Serialize;
use strata_layers::{Memory, PAGE_SIZE, ScanHit, Scanner};

/// PDB names of Windows kernels.
pub const KERNEL_PDBS: [&str; 4] = ["ntkrnlmp.pdb", "ntkrnlpa.pdb", "ntkrpamp.pdb", "ntoskrnl.pdb"];

const RSDS: &[u8] = b"RSDS";
/// GUID (16 bytes) and age (4 bytes) following the signature.
const RECORD_SIZE: usize = 20;
const MAX_NAME_LENGTH: usize = 100;

/// A kernel `RSDS` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdbSignature {
    /// 32 uppercase hex digits, as symbol servers index PDBs.
    pub guid: String,
    pub age: u32,
    pub pdb_name: String,
    /// Offset of the `RSDS` signature in the scanned layer.
    pub signature_offset: u64,
}

impl ScanHit for PdbSignature {
    fn offset(&self) -> u64 {
        self.signature_offset
    }
}

/// A kernel signature and the image header it was traced back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelPdb {
    #[serde(flatten)]
    pub signature: PdbSignature,
    pub mz_offset: Option<u64>,
}

/// Finds `RSDS` records naming a Windows kernel PDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdbSignatureScanner;

impl PdbSignatureScanner {
    pub fn new() -> Self {
        Self
    }
}

/// Render GUID bytes: Data1..Data3 are little-endian, Data4 is raw.
fn format_guid(bytes: &[u8]) -> String {
    let data1 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let data2 = u16::from_le_bytes([bytes[4], bytes[5]]);
    let data3 = u16::from_le_bytes([bytes[6], bytes[7]]);
    let data4: String = bytes[8..16].iter().map(|b| format!("{b:02X}")).collect();
    format!("{data1:08X}{data2:04X}{data3:04X}{data4}")
}

/// Parse the record whose signature starts at `start`, if it names a kernel.
fn parse_record(data: &[u8], start: usize) -> Option<(String, u32, String)> {
    let name_start = start + RSDS.len() + RECORD_SIZE;
    let search_end = data.len().min(name_start + MAX_NAME_LENGTH + 1);
    let name_length = data.get(name_start..search_end)?.iter().position(|&b| b == 0)?;

    let name = &data[name_start..name_start + name_length];
    let pdb_name = KERNEL_PDBS.iter().find(|kernel| kernel.as_bytes() == name)?;

    let record = &data[start + RSDS.len()..name_start];
    let age = u32::from_le_bytes([record[16], record[17], record[18], record[19]]);
    Some((format_guid(&record[..16]), age, pdb_name.to_string()))
}

impl Scanner for PdbSignatureScanner {
    type Match = PdbSignature;

    fn overlap(&self) -> u64 {
        0x4000
    }

    fn scan(&mut self, data: &[u8], data_offset: u64) -> Vec<PdbSignature> {
        data.windows(RSDS.len())
            .enumerate()
            .filter(|(_, window)| *window == RSDS)
            .filter_map(|(start, _)| {
                let (guid, age, pdb_name) = parse_record(data, start)?;
                Some(PdbSignature {
                    guid,
                    age,
                    pdb_name,
                    signature_offset: data_offset + start as u64,
                })
            })
            .collect()
    }
}

/// Scan `layer` for kernel PDB signatures and locate their image headers.
///
/// For each signature, pages are checked backwards from the signature's
/// page for an `MZ` header, down to (but excluding) the page of the
/// previous signature. The walk stops at the first invalid page.
///
/// # Errors
///
/// Returns an error if the layer does not exist or cannot be read.
pub fn scan(memory: &Memory, layer: &str) -> Result<Vec<KernelPdb>> {
    let signatures = memory.scan(layer, &mut PdbSignatureScanner::new())?;

    let mut results = Vec::with_capacity(signatures.len());
    let mut min_pfn = 0;
    for signature in signatures {
        let sig_pfn = signature.signature_offset / PAGE_SIZE;
        let mut mz_offset = None;

        for pfn in (min_pfn + 1..=sig_pfn).rev() {
            let offset = pfn * PAGE_SIZE;
            if !memory.is_valid(layer, offset, 2) {
                break;
            }
            if memory.read(layer, offset, 2)? == b"MZ" {
                mz_offset = Some(offset);
                break;
            }
        }
        min_pfn = sig_pfn;

        tracing::debug!(
            pdb = %signature.pdb_name,
            guid = %signature.guid,
            offset = signature.signature_offset,
            mz_offset,
            "Found kernel PDB signature"
        );
        results.push(KernelPdb { signature, mz_offset });
    }
    Ok(results)
}
