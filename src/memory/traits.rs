/*!
 * Memory Traits
 * Abstractions the telemetry drivers consume from the heap
 */

use crate::core::types::{Address, Size};

/// Answers the size of the contiguous backing region for an object
///
/// A large object's backing region may span many tiles; the drivers only
/// ever need this one fact about an object besides its address.
pub trait AllocationOracle: Send + Sync {
    /// Size in bytes of the region backing the object at `addr`, if known
    fn allocation_size(&self, addr: Address) -> Option<Size>;
}

impl<F> AllocationOracle for F
where
    F: Fn(Address) -> Option<Size> + Send + Sync,
{
    fn allocation_size(&self, addr: Address) -> Option<Size> {
        self(addr)
    }
}
