/*!
 * Memory Module
 * Simulated large object space and the allocation-size oracle
 */

pub mod los;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use los::LargeObjectSpace;
pub use traits::*;
pub use types::*;
