/*!
 * Tile Statistics
 * Per-tile counters rebuilt from zero on every collection pass
 */

use crate::core::types::Size;
use serde::{Deserialize, Serialize};

/// Control classification flags sent for each tile
pub mod control {
    /// Tile holds allocated data
    pub const USED: u8 = 1;
    /// Tile is outside any space and drawn as background
    pub const BACKGROUND: u8 = 2;
    /// Tile is inside the space but not in use
    pub const UNUSED: u8 = 4;
    /// Tile separates two spaces
    pub const SEPARATOR: u8 = 8;
    /// Tile links to another space
    pub const LINK: u8 = 16;
}

/// Object count and bytes used for one tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileStatistics {
    pub objects: u32,
    pub used_bytes: Size,
}

impl TileStatistics {
    /// Zero both counters together
    #[inline]
    pub fn zero(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.objects == 0 && self.used_bytes == 0
    }

    /// Add `bytes` to the used counter, capping at `max`
    ///
    /// Returns true when the cap was applied.
    #[inline]
    pub fn add_used(&mut self, bytes: Size, max: Size) -> bool {
        let used = self.used_bytes.saturating_add(bytes);
        if used > max {
            self.used_bytes = max;
            true
        } else {
            self.used_bytes = used;
            false
        }
    }
}
