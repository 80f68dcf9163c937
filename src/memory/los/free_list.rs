/*!
 * Page Free List
 * Address-ordered free runs with coalescing
 */

use crate::core::types::Address;
use std::collections::BTreeMap;

/// Address-ordered list of free page runs
///
/// Runs are keyed by start address so neighbours can be merged on insert;
/// allocation is first-fit by address, which keeps the space compact towards
/// its start and the high-water mark low.
#[derive(Debug, Default)]
pub(super) struct PageFreeList {
    /// start address -> run length in pages
    runs: BTreeMap<Address, usize>,
}

impl PageFreeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a run to the list, merging with adjacent runs
    pub fn insert(&mut self, address: Address, pages: usize, page_size: usize) {
        let mut start = address;
        let mut len = pages;

        if let Some((&prev, &prev_len)) = self.runs.range(..address).next_back() {
            if prev + prev_len * page_size == address {
                self.runs.remove(&prev);
                start = prev;
                len += prev_len;
            }
        }

        let end = start + len * page_size;
        if let Some(next_len) = self.runs.remove(&end) {
            len += next_len;
        }

        self.runs.insert(start, len);
    }

    /// Take the first run that fits, splitting off any excess
    pub fn take_first_fit(&mut self, pages: usize, page_size: usize) -> Option<Address> {
        let (&start, &len) = self.runs.iter().find(|(_, &len)| len >= pages)?;
        self.runs.remove(&start);
        if len > pages {
            self.runs.insert(start + pages * page_size, len - pages);
        }
        Some(start)
    }

    /// Drop a run that ends exactly at `frontier`, returning its start
    ///
    /// Lets the owner pull the bump frontier back instead of keeping a free
    /// run at the top of the space.
    pub fn take_ending_at(&mut self, frontier: Address, page_size: usize) -> Option<Address> {
        let (&start, &len) = self.runs.iter().next_back()?;
        if start + len * page_size == frontier {
            self.runs.remove(&start);
            Some(start)
        } else {
            None
        }
    }

    pub fn free_pages(&self) -> usize {
        self.runs.values().sum()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }
}
