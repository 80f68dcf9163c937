/*!
 * Large Object Space
 * Page-granular treadmill region that backs each large object with a superpage
 */

mod free_list;

use self::free_list::PageFreeList;
use super::traits::AllocationOracle;
use super::types::{MemoryError, MemoryResult, SpaceStats, SuperPage};
use crate::core::types::{div_ceil, Address, Size};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
struct LosState {
    /// Next never-used address
    frontier: Address,
    /// Highest frontier ever reached
    high_water: Address,
    free: PageFreeList,
    /// superpage start -> pages
    superpages: BTreeMap<Address, usize>,
    used_pages: usize,
}

/// Simulated large object space
///
/// Cheap to clone; clones share the same region.
#[derive(Debug, Clone)]
pub struct LargeObjectSpace {
    start: Address,
    end: Address,
    page_size: Size,
    threshold: Size,
    state: Arc<RwLock<LosState>>,
}

impl LargeObjectSpace {
    /// Create a space covering `[start, end)`
    ///
    /// `start` is rounded up and `end` down to page boundaries.
    pub fn new(start: Address, end: Address, page_size: Size, threshold: Size) -> Self {
        let start = div_ceil(start, page_size) * page_size;
        let end = (end / page_size) * page_size;
        info!(
            start = format_args!("0x{:x}", start),
            end = format_args!("0x{:x}", end),
            page_size,
            threshold,
            "Large object space initialized"
        );
        Self {
            start,
            end: end.max(start),
            page_size,
            threshold,
            state: Arc::new(RwLock::new(LosState {
                frontier: start,
                high_water: start,
                free: PageFreeList::new(),
                superpages: BTreeMap::new(),
                used_pages: 0,
            })),
        }
    }

    #[inline]
    pub fn start(&self) -> Address {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Address {
        self.end
    }

    #[inline]
    pub fn page_size(&self) -> Size {
        self.page_size
    }

    #[inline]
    pub fn threshold(&self) -> Size {
        self.threshold
    }

    /// Allocate a superpage large enough for `size` bytes
    pub fn allocate(&self, size: Size) -> MemoryResult<Address> {
        if size == 0 || size < self.threshold {
            return Err(MemoryError::InvalidSize(size));
        }

        let pages = div_ceil(size, self.page_size);
        let mut state = self.state.write();

        let address = match state.free.take_first_fit(pages, self.page_size) {
            Some(address) => address,
            None => {
                let bytes = pages * self.page_size;
                if state.frontier + bytes > self.end {
                    let available =
                        (self.end - state.frontier) + state.free.free_pages() * self.page_size;
                    return Err(MemoryError::OutOfMemory {
                        requested: bytes,
                        available,
                    });
                }
                let address = state.frontier;
                state.frontier += bytes;
                state.high_water = state.high_water.max(state.frontier);
                address
            }
        };

        state.superpages.insert(address, pages);
        state.used_pages += pages;
        debug!(
            address = format_args!("0x{:x}", address),
            pages, size, "Allocated superpage"
        );
        Ok(address)
    }

    /// Free the superpage whose start is `address`, returning its size in bytes
    pub fn free(&self, address: Address) -> MemoryResult<Size> {
        let mut state = self.state.write();
        let pages = state
            .superpages
            .remove(&address)
            .ok_or(MemoryError::InvalidAddress(address))?;

        state.used_pages -= pages;
        state.free.insert(address, pages, self.page_size);

        // Give trailing free runs back to the frontier
        let frontier = state.frontier;
        if let Some(run_start) = state.free.take_ending_at(frontier, self.page_size) {
            state.frontier = run_start;
        }

        debug!(address = format_args!("0x{:x}", address), pages, "Freed superpage");
        Ok(pages * self.page_size)
    }

    /// The superpage containing `addr`, if any
    pub fn superpage_of(&self, addr: Address) -> Option<SuperPage> {
        let state = self.state.read();
        let (&address, &pages) = state.superpages.range(..=addr).next_back()?;
        let sp = SuperPage { address, pages };
        sp.contains(addr, self.page_size).then_some(sp)
    }

    /// Start addresses of every allocated superpage, in address order
    pub fn objects(&self) -> Vec<Address> {
        self.state.read().superpages.keys().copied().collect()
    }

    pub fn stats(&self) -> SpaceStats {
        let state = self.state.read();
        SpaceStats {
            capacity_bytes: self.end - self.start,
            used_bytes: state.used_pages * self.page_size,
            superpages: state.superpages.len(),
            free_runs: state.free.len(),
            high_water: state.high_water,
        }
    }
}

impl AllocationOracle for LargeObjectSpace {
    fn allocation_size(&self, addr: Address) -> Option<Size> {
        self.superpage_of(addr).map(|sp| sp.bytes(self.page_size))
    }
}
