//! Memory layers for Strata.
//!
//! A [`Layer`] is an addressable view over memory. Physical layers read from
//! a buffer or an image file; paged layers translate virtual addresses
//! through page tables held in a lower layer. Live layers are registered by
//! name in a [`Memory`] namespace, which also drives [`Scanner`]s across a
//! layer's address space.

pub mod error;
pub mod intel;
pub mod layer;
pub mod memory;
pub mod physical;
pub mod scanners;

pub use error::{Error, Result};
pub use intel::{IntelLayer, PagingMode};
pub use layer::Layer;
pub use memory::Memory;
pub use physical::{BufferLayer, FileLayer};
pub use scanners::{BytesScanner, MultiStringMatch, MultiStringScanner, RegexScanner, ScanHit, Scanner};

/// Size of a small page on every supported architecture.
pub const PAGE_SIZE: u64 = 0x1000;
