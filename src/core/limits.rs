/*!
 * System Limits and Constants
 *
 * Centralized location for sizing defaults, stream identifiers and
 * protocol constants used by the telemetry drivers.
 */

use crate::core::types::{Address, Size, StreamId};

// =============================================================================
// SPACE GEOMETRY
// =============================================================================

/// Default tile size (128KB)
/// One tile is the unit of telemetry granularity shown by the monitor
pub const DEFAULT_TILE_SIZE: Size = 128 * 1024;

/// Page size of the large object space (4KB)
/// Superpages are whole multiples of this
pub const PAGE_SIZE: Size = 4 * 1024;

/// Large object threshold (16KB)
/// Objects below this never reach the treadmill space
pub const DEFAULT_LOS_THRESHOLD: Size = 16 * 1024;

/// Default start of the simulated large object region
pub const DEFAULT_SPACE_START: Address = 0x6000_0000;

/// Default end of the simulated large object region (256MB region)
pub const DEFAULT_SPACE_END: Address = DEFAULT_SPACE_START + 256 * 1024 * 1024;

/// Kibibyte boundary for block size labels
pub const KB: Size = 1024;

// =============================================================================
// STREAMS
// =============================================================================

/// Used space stream identifier
pub const LOS_USED_SPACE_STREAM: StreamId = 0;

/// Objects stream identifier
pub const LOS_OBJECTS_STREAM: StreamId = 1;

/// Items sent in the used-space summary (total used, region size)
pub const USED_SPACE_SUMMARY_ITEMS: usize = 2;

/// Items sent in the objects summary (total objects)
pub const OBJECTS_SUMMARY_ITEMS: usize = 1;

// =============================================================================
// MONITOR
// =============================================================================

/// Maximum number of collection events a monitor can enable
pub const MAX_EVENTS: usize = 32;

/// Bounded channel capacity for in-process frame transport
pub const FRAME_CHANNEL_CAPACITY: usize = 1024;

/// Largest frame accepted from a size-prefixed reader (64MB)
pub const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;
