/*!
 * Core Types
 * Common types used across the telemetry layer
 */

/// Address type for heap locations (flat address space)
pub type Address = usize;

/// Size type for byte counts
pub type Size = usize;

/// Index of a tile within a tracked subspace
pub type TileIndex = usize;

/// Identifier the monitor uses for a visualised space
pub type SpaceId = u32;

/// Identifier of a metric stream within a space
pub type StreamId = u8;

/// Collection event number (pass start, pass end, ...)
pub type EventId = u32;

/// Ceiling division for byte ranges
#[inline]
pub const fn div_ceil(value: Size, divisor: Size) -> Size {
    if value == 0 {
        0
    } else {
        (value - 1) / divisor + 1
    }
}
