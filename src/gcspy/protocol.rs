/*!
 * Transmission Protocol
 * Typed frames a monitor receives for one space after each pass
 *
 * Order per transmission is fixed and the client parses by position:
 *
 * ```text
 * Start -> Metadata -> (Stream, Summary)* -> Control -> End
 * ```
 */

use super::stream::MetricStream;
use crate::core::data_structures::InlineString;
use crate::core::types::{EventId, SpaceId, StreamId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static description of a space plus its current tile labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceMetadata {
    pub space_id: SpaceId,
    pub server_name: InlineString,
    pub driver_name: InlineString,
    pub title: InlineString,
    pub block_info: InlineString,
    pub tile_count: u32,
    pub unused_label: InlineString,
    pub main_space: bool,
    pub tile_names: Vec<InlineString>,
    pub streams: Vec<MetricStream>,
}

/// One protocol frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    Start {
        space_id: SpaceId,
        event: EventId,
        tile_count: u32,
    },
    Metadata(SpaceMetadata),
    Stream {
        stream_id: StreamId,
        values: Vec<i64>,
    },
    Summary {
        stream_id: StreamId,
        values: Vec<i64>,
    },
    Control {
        first_index: u32,
        flags: Vec<u8>,
    },
    End {
        space_size: u64,
    },
}

impl Frame {
    pub fn section(&self) -> Section {
        match self {
            Frame::Start { .. } => Section::Start,
            Frame::Metadata(_) => Section::Metadata,
            Frame::Stream { .. } => Section::Stream,
            Frame::Summary { .. } => Section::Summary,
            Frame::Control { .. } => Section::Control,
            Frame::End { .. } => Section::End,
        }
    }
}

/// Section kinds, used for ordering checks and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Start,
    Metadata,
    Stream,
    Summary,
    Control,
    End,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Start => "start",
            Section::Metadata => "metadata",
            Section::Stream => "stream",
            Section::Summary => "summary",
            Section::Control => "control",
            Section::End => "end",
        };
        f.write_str(name)
    }
}
