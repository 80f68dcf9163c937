/*!
 * Binary Serialization with bincode
 * Compact size-prefixed encoding for frames sent to a monitor
 */

use crate::core::limits::MAX_FRAME_BYTES;
use serde::{de::DeserializeOwned, Serialize};
use std::io::{ErrorKind, Read};

/// Result type for bincode operations
pub type BincodeResult<T> = Result<T, BincodeError>;

/// Binary serialization errors
#[derive(Debug, thiserror::Error)]
pub enum BincodeError {
    #[error("Serialization error ({context}): {source}")]
    Serialization {
        context: &'static str,
        #[source]
        source: bincode::Error,
    },
    #[error("Deserialization error ({context}): {source}")]
    Deserialization {
        context: &'static str,
        #[source]
        source: bincode::Error,
    },
    #[error("Frame error: {0}")]
    Frame(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Serialization Functions
// ============================================================================

/// Serialize to binary bytes using bincode
#[inline]
pub fn to_vec<T: Serialize>(value: &T) -> BincodeResult<Vec<u8>> {
    bincode::serialize(value).map_err(|source| BincodeError::Serialization {
        context: "standard serialization",
        source,
    })
}

/// Deserialize from binary bytes using bincode
#[inline]
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> BincodeResult<T> {
    bincode::deserialize(bytes).map_err(|source| BincodeError::Deserialization {
        context: "standard deserialization",
        source,
    })
}

// ============================================================================
// Streaming Helpers
// ============================================================================

/// Serialize with size prefix (for streaming scenarios)
///
/// Format: [4-byte little-endian length][bincode data]
pub fn to_vec_with_size<T: Serialize>(value: &T) -> BincodeResult<Vec<u8>> {
    let data = to_vec(value)?;
    let len = u32::try_from(data.len())
        .map_err(|_| BincodeError::Frame(format!("payload of {} bytes too large", data.len())))?;

    let mut result = Vec::with_capacity(4 + data.len());
    result.extend_from_slice(&len.to_le_bytes());
    result.extend_from_slice(&data);

    Ok(result)
}

/// Deserialize from size-prefixed format
pub fn from_slice_with_size<T: DeserializeOwned>(bytes: &[u8]) -> BincodeResult<T> {
    if bytes.len() < 4 {
        return Err(BincodeError::Frame(
            "Buffer too small for size prefix".to_string(),
        ));
    }

    let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;

    if bytes.len() < 4 + len {
        return Err(BincodeError::Frame(format!(
            "Buffer too small: expected {} bytes, got {}",
            4 + len,
            bytes.len()
        )));
    }

    from_slice(&bytes[4..4 + len])
}

/// Read one size-prefixed value from a stream
///
/// Returns `Ok(None)` on a clean end of stream before the prefix.
pub fn read_with_size<T: DeserializeOwned, R: Read>(reader: &mut R) -> BincodeResult<Option<T>> {
    let mut prefix = [0u8; 4];
    match reader.read_exact(&mut prefix) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(prefix) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(BincodeError::Frame(format!(
            "frame of {} bytes exceeds limit of {}",
            len, MAX_FRAME_BYTES
        )));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    from_slice(&payload).map(Some)
}
