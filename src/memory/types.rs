/*!
 * Memory Types
 * Common types for the simulated large object space
 */

use crate::core::types::{Address, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryError {
    #[error("Out of memory: requested {requested} bytes, available {available} bytes")]
    OutOfMemory { requested: Size, available: Size },

    #[error("Invalid memory address: 0x{0:x}")]
    InvalidAddress(Address),

    #[error("Invalid allocation size: {0}")]
    InvalidSize(Size),
}

/// A contiguous page-granular region backing one large object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperPage {
    pub address: Address,
    pub pages: usize,
}

impl SuperPage {
    #[inline]
    pub fn bytes(&self, page_size: Size) -> Size {
        self.pages * page_size
    }

    #[inline]
    pub fn contains(&self, addr: Address, page_size: Size) -> bool {
        addr >= self.address && addr < self.address + self.bytes(page_size)
    }
}

/// Large object space statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpaceStats {
    pub capacity_bytes: Size,
    pub used_bytes: Size,
    pub superpages: usize,
    pub free_runs: usize,
    /// Bump frontier: highest address ever handed out
    pub high_water: Address,
}
