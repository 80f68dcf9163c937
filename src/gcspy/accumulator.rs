/*!
 * Tile Accumulator
 * Attributes live objects to the tiles their backing regions span
 *
 * A driver owns one accumulator. Hosts that trace in parallel give each
 * worker its own (see [`TileAccumulator::partial`]) and merge them into the
 * driver before the pass ends.
 */

use super::subspace::Subspace;
use super::tile::TileStatistics;
use crate::core::types::{div_ceil, Address, Size, TileIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Occurrences of recoverable accounting anomalies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingStats {
    /// Tile updates capped at the used-space maximum
    pub clamped_tiles: u64,
    /// Tile updates dropped because the tile lies beyond the tile array
    pub out_of_range_tiles: u64,
    /// Objects whose address lies below the subspace start
    pub below_start: u64,
}

impl AccountingStats {
    fn absorb(&mut self, other: &AccountingStats) {
        self.clamped_tiles += other.clamped_tiles;
        self.out_of_range_tiles += other.out_of_range_tiles;
        self.below_start += other.below_start;
    }
}

/// Tile array plus running totals for one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileAccumulator {
    tiles: Vec<TileStatistics>,
    max_used: Size,
    total_objects: u64,
    total_used_bytes: u64,
    highest: Address,
    observed: bool,
    stats: AccountingStats,
}

impl TileAccumulator {
    /// Create an accumulator with room for `capacity` tiles
    ///
    /// `max_used` is the per-tile cap applied to used bytes.
    pub fn new(capacity: usize, max_used: Size, floor: Address) -> Self {
        Self {
            tiles: vec![TileStatistics::default(); capacity],
            max_used,
            total_objects: 0,
            total_used_bytes: 0,
            highest: floor,
            observed: false,
            stats: AccountingStats::default(),
        }
    }

    /// Empty accumulator with the same geometry, for a tracing worker
    pub fn partial(&self) -> Self {
        Self::new(self.tiles.len(), self.max_used, self.highest)
    }

    /// Zero every tile and the running totals
    ///
    /// The high-water mark and anomaly counters are kept across passes.
    pub fn reset(&mut self) {
        for tile in &mut self.tiles {
            tile.zero();
        }
        self.total_objects = 0;
        self.total_used_bytes = 0;
    }

    /// Record one live object of `size` bytes at `addr`
    pub fn record(&mut self, subspace: &Subspace, addr: Address, size: Size) {
        self.total_objects = self.total_objects.saturating_add(1);
        self.total_used_bytes = self.total_used_bytes.saturating_add(size as u64);
        if !self.observed || addr > self.highest {
            self.highest = addr;
        }
        self.observed = true;

        let Some(mut index) = subspace.index_for_address(addr) else {
            self.stats.below_start += 1;
            debug!(
                addr = format_args!("0x{:x}", addr),
                start = format_args!("0x{:x}", subspace.start()),
                "Object below tracked start, skipping tile attribution"
            );
            return;
        };

        if let Some(tile) = self.tiles.get_mut(index) {
            tile.objects = tile.objects.saturating_add(1);
        }

        let tile_size = subspace.tile_size();
        let remaining = subspace.remaining_in_tile(addr);

        if size <= remaining {
            self.attribute(index, size);
            return;
        }

        self.attribute(index, remaining);
        let mut left = size - remaining;
        index += 1;

        while left >= tile_size {
            if index >= self.tiles.len() {
                // Everything from here on is past the tile array
                self.stats.out_of_range_tiles += div_ceil(left, tile_size) as u64;
                return;
            }
            self.attribute(index, tile_size);
            left -= tile_size;
            index += 1;
        }

        if left > 0 {
            self.attribute(index, left);
        }
    }

    fn attribute(&mut self, index: TileIndex, bytes: Size) {
        match self.tiles.get_mut(index) {
            Some(tile) => {
                if tile.add_used(bytes, self.max_used) {
                    self.stats.clamped_tiles += 1;
                    debug!(index, max = self.max_used, "Tile used space clamped");
                }
            }
            None => self.stats.out_of_range_tiles += 1,
        }
    }

    /// Fold a worker's partial results into this accumulator
    pub fn merge(&mut self, other: &TileAccumulator) {
        for (tile, theirs) in self.tiles.iter_mut().zip(&other.tiles) {
            tile.objects = tile.objects.saturating_add(theirs.objects);
            if tile.add_used(theirs.used_bytes, self.max_used) {
                self.stats.clamped_tiles += 1;
            }
        }
        self.total_objects = self.total_objects.saturating_add(other.total_objects);
        self.total_used_bytes = self.total_used_bytes.saturating_add(other.total_used_bytes);
        if other.observed && (!self.observed || other.highest > self.highest) {
            self.highest = other.highest;
        }
        self.observed |= other.observed;
        self.stats.absorb(&other.stats);
    }

    #[inline]
    pub fn tile(&self, index: TileIndex) -> Option<&TileStatistics> {
        self.tiles.get(index)
    }

    #[inline]
    pub fn tiles(&self) -> &[TileStatistics] {
        &self.tiles
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn max_used(&self) -> Size {
        self.max_used
    }

    #[inline]
    pub fn total_objects(&self) -> u64 {
        self.total_objects
    }

    /// Exact sum of recorded sizes, unaffected by clamping
    #[inline]
    pub fn total_used_bytes(&self) -> u64 {
        self.total_used_bytes
    }

    /// Highest object address seen since construction
    #[inline]
    pub fn highest_observed(&self) -> Option<Address> {
        self.observed.then_some(self.highest)
    }

    #[inline]
    pub fn stats(&self) -> &AccountingStats {
        &self.stats
    }
}
