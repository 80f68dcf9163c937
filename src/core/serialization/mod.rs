/*!
 * Serialization Utilities
 *
 * - Bincode with a size prefix for framed monitor transports
 * - JSON for configuration and line-oriented debugging output
 */

pub mod bincode;
pub mod json;

pub use self::bincode::{from_slice_with_size, read_with_size, to_vec_with_size, BincodeError};
