/*!
 * Core Module
 * Fundamental types, limits, errors and serialization
 */

pub mod data_structures;
pub mod errors;
pub mod limits;
pub mod serialization;
pub mod types;

// Re-export for convenience
pub use data_structures::InlineString;
pub use errors::*;
pub use types::*;
