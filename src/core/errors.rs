/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::data_structures::InlineString;
use crate::core::types::{Size, StreamId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export MemoryError from memory module
pub use crate::memory::MemoryError;

/// Result type for telemetry transmission
pub type SpyResult<T> = Result<T, SpyError>;

/// Transport-level errors raised while writing frames to a monitor
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum TransportError {
    #[error("Transport write failed: {0}")]
    #[diagnostic(
        code(transport::io),
        help("The monitor connection may have dropped. The collection pass is unaffected.")
    )]
    Io(InlineString),

    #[error("Frame encoding failed: {0}")]
    #[diagnostic(code(transport::encode))]
    Encode(InlineString),

    #[error("Monitor disconnected")]
    #[diagnostic(
        code(transport::disconnected),
        help("No receiver is attached to the frame channel.")
    )]
    Disconnected,
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string().into())
    }
}

/// Protocol errors: a transmission section was emitted out of order
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProtocolError {
    #[error("Section {found} emitted while expecting {expected}")]
    #[diagnostic(
        code(protocol::section_out_of_order),
        help("The client parses by position: start, metadata, streams, control, end.")
    )]
    SectionOutOfOrder {
        expected: InlineString,
        found: InlineString,
    },

    #[error("Stream {stream_id} declared {declared} values but {emitted} were emitted")]
    #[diagnostic(code(protocol::count_mismatch))]
    CountMismatch {
        stream_id: StreamId,
        declared: usize,
        emitted: usize,
    },
}

/// Top-level telemetry error
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SpyError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Configuration errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Invalid tile size: {0}")]
    #[diagnostic(code(config::invalid_tile_size), help("Tile size must be non-zero."))]
    InvalidTileSize(Size),

    #[error("Tile size {tile_size} is not a multiple of page size {page_size}")]
    #[diagnostic(
        code(config::tile_size_not_page_multiple),
        help("Superpages are page granular; tiles must align with them.")
    )]
    TileSizeNotPageMultiple { tile_size: Size, page_size: Size },

    #[error("Invalid large object threshold: {0}")]
    #[diagnostic(code(config::invalid_threshold))]
    InvalidThreshold(Size),

    #[error("Invalid space range: 0x{start:x}..0x{end:x}")]
    #[diagnostic(code(config::invalid_range), help("The space end must lie above its start."))]
    InvalidRange { start: usize, end: usize },

    #[error("Failed to parse configuration: {0}")]
    #[diagnostic(code(config::parse))]
    Parse(InlineString),
}
