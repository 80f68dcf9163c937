/*!
 * Subspace
 * A tracked contiguous address range partitioned into fixed-size tiles
 */

use crate::core::types::{div_ceil, Address, Size, TileIndex};
use serde::{Deserialize, Serialize};

/// Tracked address range and its tiling
///
/// Tile `i` covers `[start + (i - first_index) * tile_size, start + (i + 1 - first_index) * tile_size)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subspace {
    start: Address,
    end: Address,
    first_index: TileIndex,
    tile_size: Size,
    tile_count: usize,
}

impl Subspace {
    /// Create a subspace
    ///
    /// `end` below `start` is raised to `start`. `tile_size` must be non-zero.
    pub fn new(
        start: Address,
        end: Address,
        first_index: TileIndex,
        tile_size: Size,
        tile_count: usize,
    ) -> Self {
        assert!(tile_size > 0, "tile size must be non-zero");
        Self {
            start,
            end: end.max(start),
            first_index,
            tile_size,
            tile_count,
        }
    }

    /// Number of tiles needed to cover `[start, end)`
    #[inline]
    pub fn count_tiles(start: Address, end: Address, tile_size: Size) -> usize {
        div_ceil(end.saturating_sub(start), tile_size)
    }

    /// Tile index for an address, `None` below the start
    #[inline]
    pub fn index_for_address(&self, addr: Address) -> Option<TileIndex> {
        let offset = addr.checked_sub(self.start)?;
        Some(offset / self.tile_size + self.first_index)
    }

    /// Bytes from `addr` to the end of its tile
    #[inline]
    pub fn remaining_in_tile(&self, addr: Address) -> Size {
        let offset = addr.saturating_sub(self.start);
        self.tile_size - offset % self.tile_size
    }

    /// Replace the tracked bounds
    ///
    /// The owner must already hold tile storage for `tile_count` tiles.
    pub fn reset(&mut self, start: Address, end: Address, first_index: TileIndex, tile_count: usize) {
        self.start = start;
        self.end = end.max(start);
        self.first_index = first_index;
        self.tile_count = tile_count;
    }

    #[inline]
    pub fn index_in_range(&self, index: TileIndex) -> bool {
        index >= self.first_index && index < self.first_index + self.tile_count
    }

    /// Address range covered by tile `index`, if it is in range
    pub fn tile_bounds(&self, index: TileIndex) -> Option<(Address, Address)> {
        if !self.index_in_range(index) {
            return None;
        }
        let lo = self.start + (index - self.first_index) * self.tile_size;
        Some((lo, lo + self.tile_size))
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
    pub fn first_index(&self) -> TileIndex {
        self.first_index
    }

    #[inline]
    pub fn tile_size(&self) -> Size {
        self.tile_size
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    /// Size of the tracked range in bytes
    #[inline]
    pub fn byte_len(&self) -> Size {
        self.end - self.start
    }
}
