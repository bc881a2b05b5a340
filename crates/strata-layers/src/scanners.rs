//! Scanners run across a layer by [`Memory::scan`](crate::Memory::scan)

use crate::Result;
use regex::bytes::Regex;
use serde::Serialize;

/// A scan result that knows where in the layer it was found.
pub trait ScanHit {
    fn offset(&self) -> u64;

    /// One past the last byte the hit covers. The next hit kept by
    /// [`Memory::scan`](crate::Memory::scan) starts at or after it.
    fn end(&self) -> u64 {
        self.offset() + 1
    }
}

impl ScanHit for u64 {
    fn offset(&self) -> u64 {
        *self
    }
}

/// Searches one window of layer data at a time.
pub trait Scanner {
    type Match: ScanHit;

    /// Bytes read past the end of each window so patterns straddling a
    /// boundary are still seen whole.
    fn overlap(&self) -> u64 {
        0x1000
    }

    /// Distance between the starts of consecutive windows.
    fn chunk_size(&self) -> u64 {
        0x100_0000
    }

    /// Scan `data`, which starts at `data_offset` in the layer.
    fn scan(&mut self, data: &[u8], data_offset: u64) -> Vec<Self::Match>;
}

/// Escape arbitrary bytes into a regex matching them literally.
fn literal_pattern(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("\\x{b:02x}")).collect()
}

/// Finds every (possibly overlapping) occurrence of a fixed needle.
#[derive(Debug, Clone)]
pub struct BytesScanner {
    needle: Vec<u8>,
    chunk_size: u64,
}

impl BytesScanner {
    pub fn new(needle: impl Into<Vec<u8>>) -> Self {
        Self {
            needle: needle.into(),
            chunk_size: 0x100_0000,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

impl Scanner for BytesScanner {
    type Match = u64;

    fn overlap(&self) -> u64 {
        self.needle.len() as u64
    }

    fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    fn scan(&mut self, data: &[u8], data_offset: u64) -> Vec<u64> {
        if self.needle.is_empty() {
            return Vec::new();
        }
        data.windows(self.needle.len())
            .enumerate()
            .filter(|(_, window)| *window == self.needle.as_slice())
            .map(|(index, _)| data_offset + index as u64)
            .collect()
    }
}

/// Reports the start of every non-overlapping regex match.
#[derive(Debug, Clone)]
pub struct RegexScanner {
    regex: Regex,
    overlap: u64,
}

impl RegexScanner {
    /// Compile a byte-oriented regular expression.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            overlap: 0x1000,
        })
    }

    /// Longest match expected; windows overlap by this much.
    pub fn with_overlap(mut self, overlap: u64) -> Self {
        self.overlap = overlap;
        self
    }
}

impl Scanner for RegexScanner {
    type Match = u64;

    fn overlap(&self) -> u64 {
        self.overlap
    }

    fn scan(&mut self, data: &[u8], data_offset: u64) -> Vec<u64> {
        self.regex
            .find_iter(data)
            .map(|m| data_offset + m.start() as u64)
            .collect()
    }
}

/// A hit from [`MultiStringScanner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiStringMatch {
    pub offset: u64,
    pub pattern: Vec<u8>,
}

impl ScanHit for MultiStringMatch {
    fn offset(&self) -> u64 {
        self.offset
    }

    fn end(&self) -> u64 {
        self.offset + self.pattern.len() as u64
    }
}

/// Searches for several fixed byte strings in one pass.
///
/// Matches do not overlap; where two patterns start at the same offset the
/// longer one is reported.
#[derive(Debug, Clone)]
pub struct MultiStringScanner {
    regex: Option<Regex>,
    longest: usize,
    chunk_size: u64,
}

impl MultiStringScanner {
    pub fn new<P: AsRef<[u8]>>(patterns: &[P]) -> Result<Self> {
        let mut patterns: Vec<&[u8]> = patterns
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| !p.is_empty())
            .collect();
        patterns.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        patterns.dedup();

        let longest = patterns.first().map_or(0, |p| p.len());
        let regex = if patterns.is_empty() {
            None
        } else {
            let alternation = patterns
                .iter()
                .map(|p| format!("(?:{})", literal_pattern(p)))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!("(?s-u){alternation}"))?)
        };
        Ok(Self {
            regex,
            longest,
            chunk_size: 0x100_0000,
        })
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

impl Scanner for MultiStringScanner {
    type Match = MultiStringMatch;

    fn overlap(&self) -> u64 {
        self.longest as u64
    }

    fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    fn scan(&mut self, data: &[u8], data_offset: u64) -> Vec<MultiStringMatch> {
        let Some(regex) = &self.regex else {
            return Vec::new();
        };
        regex
            .find_iter(data)
            .map(|m| MultiStringMatch {
                offset: data_offset + m.start() as u64,
                pattern: m.as_bytes().to_vec(),
            })
            .collect()
    }
}
