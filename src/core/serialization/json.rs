/*!
 * JSON Serialization
 * Human-readable encoding for configuration and debugging output
 */

use serde::{de::DeserializeOwned, Serialize};

/// Result type for JSON operations
pub type JsonResult<T> = Result<T, serde_json::Error>;

/// Serialize a value to a single JSON line (no trailing newline)
#[inline]
pub fn to_line<T: Serialize>(value: &T) -> JsonResult<String> {
    serde_json::to_string(value)
}

/// Deserialize from a JSON string
#[inline]
pub fn from_str<T: DeserializeOwned>(s: &str) -> JsonResult<T> {
    serde_json::from_str(s)
}
